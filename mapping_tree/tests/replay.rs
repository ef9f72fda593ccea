use anyhow::Result;
use pretty_assertions::assert_eq;
use mapping_tree::{MappingError, MappingTree};
use mapping_tree::order::VisitOrder;
use mapping_tree::tree::entry::{ArgEntry, FieldEntry, MetadataEntry, MethodEntry, VarEntry};
use mapping_tree::visitor::MappingFlags;

mod common;
use common::Recorder;

fn tree() -> Result<MappingTree> {
	let mut tree = common::tree("a", &["b", "c"])?;
	tree.add_metadata(MetadataEntry::new("title", Some("x")));

	let b = tree.add_class(common::class("B", &[Some("B1")]));
	b.info.comment = Some("cb".to_owned());
	let mut field = FieldEntry::new("z", Some("I"));
	field.info.dst_names.set(0, Some("z1".to_owned()));
	b.add_field(field);
	let mut method = MethodEntry::new("m", Some("()V"));
	method.info.dst_names.set(0, Some("m1".to_owned()));
	method.info.comment = Some("cm".to_owned());
	let mut arg = ArgEntry::new(Some(0), Some(1), None);
	arg.info.dst_names.set(0, Some("p".to_owned()));
	method.add_arg(arg);
	let mut var = VarEntry::new(Some(0), Some(2), Some(0), None, None);
	var.info.dst_names.set(0, Some("v".to_owned()));
	method.add_var(var);
	b.add_method(method);

	tree.add_class(common::class("A", &[]));
	Ok(tree)
}

#[test]
fn input_order() -> Result<()> {
	let recorder = tree()?.accept(Recorder::new(), &VisitOrder::by_input_order())?;

	assert_eq!(recorder.text(), "\
pass 1 a -> b c
meta title Some(\"x\")
class B
	dst 0 B1
	comment cb
	field z Some(\"I\")
		dst 0 z1
	method m Some(\"()V\")
		dst 0 m1
		comment cm
		arg Some(0) Some(1) None
			dst 0 p
		var Some(0) Some(2) Some(0) None None
			dst 0 v
class A
end
");
	Ok(())
}

#[test]
fn by_name_methods_and_vars_first() -> Result<()> {
	let order = VisitOrder::by_name().methods_first(true).method_vars_first(true);
	let recorder = tree()?.accept(Recorder::new(), &order)?;

	assert_eq!(recorder.lines, vec![
		"pass 1 a -> b c",
		"meta title Some(\"x\")",
		"class A",
		"class B",
		"\tdst 0 B1",
		"\tcomment cb",
		"\tmethod m Some(\"()V\")",
		"\t\tdst 0 m1",
		"\t\tcomment cm",
		"\t\tvar Some(0) Some(2) Some(0) None None",
		"\t\t\tdst 0 v",
		"\t\targ Some(0) Some(1) None",
		"\t\t\tdst 0 p",
		"\tfield z Some(\"I\")",
		"\t\tdst 0 z1",
		"end",
	]);
	Ok(())
}

#[test]
fn skipped_elements() -> Result<()> {
	let mut recorder = Recorder::new();
	recorder.skip_classes = vec!["A".to_owned()];
	recorder.skip_method_content = true;
	let recorder = tree()?.accept(recorder, &VisitOrder::by_input_order())?;

	assert_eq!(recorder.lines, vec![
		"pass 1 a -> b c",
		"meta title Some(\"x\")",
		"class B",
		"\tdst 0 B1",
		"\tcomment cb",
		"\tfield z Some(\"I\")",
		"\t\tdst 0 z1",
		"\tmethod m Some(\"()V\")",
		"\t\tdst 0 m1",
		"\t\tcomment cm",
		"end",
	]);
	Ok(())
}

#[test]
fn multiple_passes() -> Result<()> {
	let mut tree = common::tree("a", &["b"])?;
	tree.add_class(common::class("A", &[Some("A1")]));

	let mut recorder = Recorder::new();
	recorder.passes = 3;
	let recorder = tree.accept(recorder, &VisitOrder::default())?;
	assert_eq!(recorder.lines, vec![
		"pass 1 a -> b", "class A", "\tdst 0 A1", "end",
		"pass 2 a -> b", "class A", "\tdst 0 A1", "end",
		"pass 3 a -> b", "class A", "\tdst 0 A1", "end",
	]);

	tree.set_max_passes(2);
	let mut recorder = Recorder::new();
	recorder.passes = 3;
	let error = tree.accept(recorder, &VisitOrder::default()).unwrap_err();
	assert_eq!(error.downcast_ref::<MappingError>(), Some(&MappingError::TooManyPasses { max: 2 }));
	Ok(())
}

#[test]
fn destination_descriptors() -> Result<()> {
	let mut tree = common::tree("a", &["b", "c"])?;
	let b = tree.add_class(common::class("B", &[Some("B1")]));
	let mut method = MethodEntry::new("m", Some("(LB;I)LA;"));
	method.info.dst_names.set(1, Some("m2".to_owned()));
	b.add_method(method);
	b.add_field(FieldEntry::new("f", Some("LB;")));
	tree.add_class(common::class("A", &[None, Some("A2")]));

	let flags = MappingFlags { needs_dst_method_desc: true, ..MappingFlags::none() };
	let recorder = tree.accept(Recorder::with_flags(flags), &VisitOrder::default())?;
	assert_eq!(recorder.lines, vec![
		"pass 1 a -> b c",
		"class B",
		"\tdst 0 B1",
		"\tfield f Some(\"LB;\")",
		"\tmethod m Some(\"(LB;I)LA;\")",
		"\t\tdst 1 m2",
		"\t\tdst_desc 0 (LB1;I)LA;",
		"\t\tdst_desc 1 (LB;I)LA2;",
		"class A",
		"\tdst 1 A2",
		"end",
	]);
	Ok(())
}

#[test]
fn missing_source_descriptor() -> Result<()> {
	let mut tree = common::tree("a", &["b"])?;
	let class = tree.add_class(common::class("A", &[]));
	class.add_field(FieldEntry::new("f", None));
	class.add_method(MethodEntry::new("m", None));

	// field descriptors are not needed here
	let flags = MappingFlags { needs_src_method_desc: true, ..MappingFlags::none() };
	let error = tree.accept(Recorder::with_flags(flags), &VisitOrder::default()).unwrap_err();
	assert_eq!(
		error.downcast_ref::<MappingError>(),
		Some(&MappingError::MissingSrcDescriptor { element: "method \"m\"".to_owned() }),
	);

	let error = tree.accept(Recorder::with_flags(MappingFlags::all()), &VisitOrder::default()).unwrap_err();
	assert_eq!(
		error.downcast_ref::<MappingError>(),
		Some(&MappingError::MissingSrcDescriptor { element: "field \"f\"".to_owned() }),
	);
	Ok(())
}

#[test]
fn unique_metadata() -> Result<()> {
	let mut tree = common::tree("a", &[])?;
	tree.add_metadata(MetadataEntry::new("k", Some("1")));
	tree.add_metadata(MetadataEntry::new("other", None));
	tree.add_metadata(MetadataEntry::new("k", Some("2")));

	let recorder = tree.accept(Recorder::new(), &VisitOrder::default())?;
	assert_eq!(recorder.lines, vec!["pass 1 a -> ", "meta k Some(\"1\")", "meta other None", "meta k Some(\"2\")", "end"]);

	let flags = MappingFlags { needs_metadata_uniqueness: true, ..MappingFlags::none() };
	let recorder = tree.accept(Recorder::with_flags(flags), &VisitOrder::default())?;
	assert_eq!(recorder.lines, vec!["pass 1 a -> ", "meta other None", "meta k Some(\"2\")", "end"]);
	Ok(())
}

#[test]
fn empty_tree_has_nothing_to_replay() {
	let error = MappingTree::new().accept(Recorder::new(), &VisitOrder::default());
	assert!(error.is_err());
}
