//! Helpers shared by the integration tests.

#![allow(dead_code)]

use std::ops::ControlFlow;
use anyhow::Result;
use mapping_tree::MappingTree;
use mapping_tree::tree::entry::ClassEntry;
use mapping_tree::visitor::{
	ClassContentVisitor, ContentVisitor, ElementContentVisitor, ElementVisitor, HeaderVisitor, MappingFlags, MappingVisitor,
	MemberVisitor, MethodContentVisitor,
};

/// Records every call of a pass as one line, indented by nesting.
///
/// It is every state of the pass at once, the nesting is tracked in `depth`.
#[derive(Debug, Default)]
pub struct Recorder {
	pub lines: Vec<String>,
	pub flags: MappingFlags,
	/// How many passes to ask for.
	pub passes: usize,
	/// Classes to skip by returning [`ControlFlow::Break`] when they are declared.
	pub skip_classes: Vec<String>,
	/// Skip the args and vars of methods.
	pub skip_method_content: bool,
	depth: usize,
	pass: usize,
}

impl Recorder {
	pub fn new() -> Recorder {
		Recorder { passes: 1, ..Recorder::default() }
	}

	pub fn with_flags(flags: MappingFlags) -> Recorder {
		Recorder { flags, ..Recorder::new() }
	}

	fn record(&mut self, line: String) {
		self.lines.push(format!("{}{line}", "\t".repeat(self.depth)));
	}

	fn enter(mut self, line: String) -> Recorder {
		self.record(line);
		self.depth += 1;
		self
	}

	fn leave(mut self) -> Recorder {
		self.depth -= 1;
		self
	}

	pub fn text(&self) -> String {
		self.lines.iter().map(|line| format!("{line}\n")).collect()
	}
}

impl MappingVisitor for Recorder {
	type Output = Recorder;
	type Header = Recorder;

	fn flags(&self) -> MappingFlags {
		self.flags
	}

	fn visit_namespaces(mut self, src_namespace: &str, dst_namespaces: &[String]) -> Result<Recorder> {
		self.pass += 1;
		self.record(format!("pass {} {src_namespace} -> {}", self.pass, dst_namespaces.join(" ")));
		Ok(self)
	}
}

impl HeaderVisitor for Recorder {
	type Pass = Recorder;
	type Content = Recorder;

	fn visit_metadata(&mut self, key: &str, value: Option<&str>) -> Result<()> {
		self.record(format!("meta {key} {value:?}"));
		Ok(())
	}

	fn visit_content(self) -> Result<ControlFlow<Recorder, Recorder>> {
		Ok(ControlFlow::Continue(self))
	}
}

impl ContentVisitor for Recorder {
	type Pass = Recorder;
	type Class = Recorder;
	type ClassContent = Recorder;
	type ClassResidual = ();

	fn visit_class(self, src_name: &str) -> Result<ControlFlow<Self, ((), Recorder)>> {
		if self.skip_classes.iter().any(|x| x == src_name) {
			return Ok(ControlFlow::Break(self));
		}
		Ok(ControlFlow::Continue(((), self.enter(format!("class {src_name}")))))
	}

	fn finish_class(_this: (), class: Recorder) -> Result<Self> {
		Ok(class.leave())
	}

	fn visit_end(mut self) -> Result<ControlFlow<Recorder, Recorder>> {
		self.record("end".to_owned());
		if self.pass < self.passes {
			Ok(ControlFlow::Continue(self))
		} else {
			Ok(ControlFlow::Break(self))
		}
	}
}

impl ElementVisitor for Recorder {
	type Content = Recorder;

	fn visit_dst_name(&mut self, namespace: usize, name: &str) -> Result<()> {
		self.record(format!("dst {namespace} {name}"));
		Ok(())
	}

	fn visit_element_content(self) -> Result<ControlFlow<Recorder, Recorder>> {
		Ok(ControlFlow::Continue(self))
	}
}

impl MemberVisitor for Recorder {
	fn visit_dst_desc(&mut self, namespace: usize, desc: &str) -> Result<()> {
		self.record(format!("dst_desc {namespace} {desc}"));
		Ok(())
	}
}

impl ElementContentVisitor for Recorder {
	fn visit_comment(&mut self, comment: &str) -> Result<()> {
		self.record(format!("comment {comment}"));
		Ok(())
	}
}

impl ClassContentVisitor for Recorder {
	type Field = Recorder;
	type FieldContent = Recorder;
	type FieldResidual = ();
	type Method = Recorder;
	type MethodContent = Recorder;
	type MethodResidual = ();

	fn visit_field(self, src_name: &str, src_desc: Option<&str>) -> Result<ControlFlow<Self, ((), Recorder)>> {
		Ok(ControlFlow::Continue(((), self.enter(format!("field {src_name} {src_desc:?}")))))
	}

	fn finish_field(_this: (), field: Recorder) -> Result<Self> {
		Ok(field.leave())
	}

	fn visit_method(self, src_name: &str, src_desc: Option<&str>) -> Result<ControlFlow<Self, ((), Recorder)>> {
		Ok(ControlFlow::Continue(((), self.enter(format!("method {src_name} {src_desc:?}")))))
	}

	fn finish_method(_this: (), method: Recorder) -> Result<Self> {
		Ok(method.leave())
	}
}

impl MethodContentVisitor for Recorder {
	type Arg = Recorder;
	type ArgContent = Recorder;
	type ArgResidual = ();
	type Var = Recorder;
	type VarContent = Recorder;
	type VarResidual = ();

	fn visit_arg(self, position: Option<u32>, lv_index: Option<u32>, src_name: Option<&str>) -> Result<ControlFlow<Self, ((), Recorder)>> {
		if self.skip_method_content {
			return Ok(ControlFlow::Break(self));
		}
		Ok(ControlFlow::Continue(((), self.enter(format!("arg {position:?} {lv_index:?} {src_name:?}")))))
	}

	fn finish_arg(_this: (), arg: Recorder) -> Result<Self> {
		Ok(arg.leave())
	}

	fn visit_var(
		self,
		lvt_row_index: Option<u32>,
		lv_index: Option<u32>,
		start_op_idx: Option<u32>,
		end_op_idx: Option<u32>,
		src_name: Option<&str>,
	) -> Result<ControlFlow<Self, ((), Recorder)>> {
		if self.skip_method_content {
			return Ok(ControlFlow::Break(self));
		}
		let line = format!("var {lvt_row_index:?} {lv_index:?} {start_op_idx:?} {end_op_idx:?} {src_name:?}");
		Ok(ControlFlow::Continue(((), self.enter(line))))
	}

	fn finish_var(_this: (), var: Recorder) -> Result<Self> {
		Ok(var.leave())
	}
}

/// A tree with the given namespaces and nothing else.
pub fn tree(src: &str, dst: &[&str]) -> Result<MappingTree> {
	let mut tree = MappingTree::new();
	tree.set_src_namespace(src)?;
	tree.set_dst_namespaces(dst.iter().map(|&x| x.to_owned()).collect())?;
	Ok(tree)
}

/// A class with the given destination names.
pub fn class(src_name: &str, dst_names: &[Option<&str>]) -> ClassEntry {
	let mut class = ClassEntry::new(src_name);
	for (namespace, name) in dst_names.iter().enumerate() {
		class.info.dst_names.set(namespace, name.map(str::to_owned));
	}
	class
}
