//! Remappers for remapping class names, descriptors, fields and methods.
//!
//! For remapping just classes and descriptors, you're interested in [`ClassRemapper`].
//! If you also want to remap field names and method names, use the [`MemberRemapper`].
//!
//! A remapper between two namespaces of a tree is created with [`MappingTree::remapper`].
//!
//! # What is a "remapper"?
//! A remapper answers the question for you "what is the name of X in namespace Y?"

use anyhow::{anyhow, bail, Context, Result};
use indexmap::IndexMap;
use crate::tree::entry::{ClassEntry, Member};
use crate::tree::lookup::is_desc_compatible;
use crate::tree::MappingTree;
use crate::tree::names::Namespace;

/// A remapper supporting remapping of class names and descriptors.
pub trait ClassRemapper {
	/// Maps a class name to a new one, if the mapping exists.
	///
	/// If the mapping doesn't exist, returns `Ok(None)`.
	fn map_class_fail(&self, class: &str) -> Result<Option<String>>;

	/// Maps a class name to a new one, if the mapping doesn't exist, return the old one.
	fn map_class(&self, class: &str) -> Result<String> {
		Ok(self.map_class_fail(class)?.unwrap_or_else(|| class.to_owned()))
	}

	/// Maps every class name in a field, method or partial method descriptor.
	///
	/// Class names without a mapping are copied over.
	fn map_desc(&self, desc: &str) -> Result<String> {
		map_desc(self, desc)
	}
}

pub(crate) fn map_desc(remapper: &(impl ClassRemapper + ?Sized), desc: &str) -> Result<String> {
	let mut s = String::with_capacity(desc.len());

	let mut iter = desc.chars();

	while let Some(ch) = iter.next() {
		s.push(ch);

		if ch == 'L' {
			let mut class_name = String::new();
			for ch in iter.by_ref() {
				class_name.push(ch);
				if ch == ';' {
					break;
				}
			}
			if class_name.pop() != Some(';') {
				bail!("descriptor {desc:?} has a missing semicolon somewhere");
			}

			let new_class_name = remapper.map_class(&class_name)?;

			s.push_str(&new_class_name);
			s.push(';');
		}
	}

	Ok(s)
}

impl ClassRemapper for IndexMap<String, String> {
	fn map_class_fail(&self, class: &str) -> Result<Option<String>> {
		Ok(self.get(class).cloned())
	}
}

/// A remapper supporting remapping fields and methods, as well as class names and descriptors.
///
/// The owner, name and descriptor are all given in the namespace mapped from. A missing descriptor matches any
/// member of that name, a partial one matches the descriptors starting with it.
pub trait MemberRemapper: ClassRemapper {
	fn map_field_name_fail(&self, owner: &str, name: &str, desc: Option<&str>) -> Result<Option<String>>;

	fn map_field_name(&self, owner: &str, name: &str, desc: Option<&str>) -> Result<String> {
		Ok(self.map_field_name_fail(owner, name, desc)?.unwrap_or_else(|| name.to_owned()))
	}

	fn map_method_name_fail(&self, owner: &str, name: &str, desc: Option<&str>) -> Result<Option<String>>;

	fn map_method_name(&self, owner: &str, name: &str, desc: Option<&str>) -> Result<String> {
		Ok(self.map_method_name_fail(owner, name, desc)?.unwrap_or_else(|| name.to_owned()))
	}
}

type MemberNames<'a> = IndexMap<(&'a str, Option<String>), &'a str>;

#[derive(Debug)]
struct TreeRemapperClass<'a> {
	name: &'a str,
	fields: MemberNames<'a>,
	methods: MemberNames<'a>,
}

/// Remaps between two namespaces of a [`MappingTree`].
#[derive(Debug)]
pub struct TreeRemapper<'a> {
	classes: IndexMap<&'a str, TreeRemapperClass<'a>>,
}

fn map_member_name(members: &MemberNames<'_>, name: &str, desc: Option<&str>) -> Option<String> {
	let mut found = None;
	for (&(member_name, ref member_desc), &new_name) in members {
		if member_name != name {
			continue;
		}
		match (desc, member_desc.as_deref()) {
			(Some(desc), Some(member_desc)) if desc == member_desc => return Some(new_name.to_owned()),
			(Some(desc), Some(member_desc)) if !is_desc_compatible(desc, member_desc) => {},
			_ => {
				found.get_or_insert(new_name);
			},
		}
	}
	found.map(str::to_owned)
}

impl ClassRemapper for TreeRemapper<'_> {
	fn map_class_fail(&self, class: &str) -> Result<Option<String>> {
		Ok(self.classes.get(class).map(|class| class.name.to_owned()))
	}
}

impl MemberRemapper for TreeRemapper<'_> {
	fn map_field_name_fail(&self, owner: &str, name: &str, desc: Option<&str>) -> Result<Option<String>> {
		Ok(self.classes.get(owner).and_then(|class| map_member_name(&class.fields, name, desc)))
	}

	fn map_method_name_fail(&self, owner: &str, name: &str, desc: Option<&str>) -> Result<Option<String>> {
		Ok(self.classes.get(owner).and_then(|class| map_member_name(&class.methods, name, desc)))
	}
}

fn member_names<'a, T: Member + 'a>(
	members: impl Iterator<Item=&'a T>,
	from: Namespace,
	to: Namespace,
	desc_from: &IndexMap<String, String>,
) -> Result<MemberNames<'a>> {
	let mut names = IndexMap::new();
	for member in members {
		if let (Some(name_from), Some(name_to)) = (member.name(from), member.name(to)) {
			let desc = member.src_desc()
				.map(|desc| desc_from.map_desc(desc))
				.transpose()?;
			names.insert((name_from, desc), name_to);
		}
	}
	Ok(names)
}

impl MappingTree {
	/// Creates a remapper from the names in namespace `from` to the ones in namespace `to`.
	pub fn remapper(&self, from: &str, to: &str) -> Result<TreeRemapper<'_>> {
		let from = self.get_namespace(from)?;
		let to = self.get_namespace(to)?;

		let desc_from = self.class_names(Namespace::Src, from);

		let mut classes = IndexMap::new();
		for class in self.classes() {
			let (Some(name_from), Some(name_to)) = (class.name(from), class.name(to)) else {
				continue;
			};
			let remapper_class = remapper_class(class, name_to, from, to, &desc_from)
				.with_context(|| anyhow!("failed to create remapper for class {:?}", class.src_name()))?;
			classes.insert(name_from, remapper_class);
		}
		Ok(TreeRemapper { classes })
	}
}

fn remapper_class<'a>(class: &'a ClassEntry, name: &'a str, from: Namespace, to: Namespace, desc_from: &IndexMap<String, String>)
		-> Result<TreeRemapperClass<'a>> {
	Ok(TreeRemapperClass {
		name,
		fields: member_names(class.fields(), from, to, desc_from)?,
		methods: member_names(class.methods(), from, to, desc_from)?,
	})
}

#[cfg(test)]
mod testing {
	use anyhow::Result;
	use indexmap::IndexMap;
	use pretty_assertions::assert_eq;
	use crate::remapper::ClassRemapper;

	#[test]
	fn map_desc() -> Result<()> {
		let remapper: IndexMap<String, String> = IndexMap::from([
			("classA1".to_owned(), "classB1".to_owned()),
			("classA2$innerA1".to_owned(), "classB2$innerB1".to_owned()),
		]);

		assert_eq!(remapper.map_desc("I")?, "I");
		assert_eq!(remapper.map_desc("[[[[LclassA1;")?, "[[[[LclassB1;");
		assert_eq!(remapper.map_desc("(LclassA1;[LclassA2$innerA1;Ljava/lang/Object;)LclassA3;")?,
			"(LclassB1;[LclassB2$innerB1;Ljava/lang/Object;)LclassA3;");
		assert_eq!(remapper.map_desc("(BCDFJSZLclassA1;)")?, "(BCDFJSZLclassB1;)");
		assert!(remapper.map_desc("(LclassA1").is_err());

		assert_eq!(remapper.map_class("classA1")?, "classB1");
		assert_eq!(remapper.map_class("classA3")?, "classA3");
		assert_eq!(remapper.map_class_fail("classA3")?, None);
		Ok(())
	}
}
