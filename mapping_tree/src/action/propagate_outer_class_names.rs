use anyhow::{bail, Result};
use log::{debug, trace};
use crate::tree::MappingTree;
use crate::tree::names::Namespace;

impl MappingTree {
	// say you have A -> a, and A$B and A$B$C without a name in the namespace, this
	// gives A$B -> a$B and A$B$C -> a$B$C
	/// Gives nested classes the remapped name of their outer class.
	///
	/// A nested class without a destination name, or with one equal to its source name, takes the name of the nearest
	/// outer class that got remapped. With `process_remapped` also nested classes that already have a different name
	/// get the unmapped parts of it replaced.
	///
	/// `namespaces` selects the destination namespaces to work on, `None` means all of them. Returns how many names
	/// changed.
	pub fn propagate_outer_class_names(&mut self, namespaces: Option<&[&str]>, process_remapped: bool) -> Result<usize> {
		let ids = match namespaces {
			None => (0..self.dst_namespaces.len()).collect(),
			Some(namespaces) => namespaces.iter()
				.map(|&name| match self.get_namespace(name)? {
					Namespace::Dst(id) => Ok(id),
					Namespace::Src => bail!("can't propagate outer class names into the source namespace {name:?}"),
				})
				.collect::<Result<Vec<usize>>>()?,
		};

		// outer classes first, so that their new names reach the classes nested in them
		let mut classes: Vec<String> = self.classes.keys()
			.filter(|name| name.contains('$'))
			.cloned()
			.collect();
		classes.sort_by_key(|name| name.matches('$').count());

		let mut changed = 0;
		for src_name in &classes {
			for &id in &ids {
				if let Some(name) = self.outer_class_dst_name(src_name, id, process_remapped) {
					trace!("propagating outer class name: {src_name:?} -> {name:?} in namespace {id}");
					if let Some(class) = self.classes.get_mut(src_name) {
						class.info.dst_names.set(id, Some(name));
						changed += 1;
					}
				}
			}
		}

		debug!("propagated outer class names to {changed} names");
		Ok(changed)
	}

	/// The new name of a nested class, or `None` if it stays as it is.
	fn outer_class_dst_name(&self, src_name: &str, id: usize, process_remapped: bool) -> Option<String> {
		let dst_name = self.classes.get(src_name)?.info.dst_names.get(id);
		if !process_remapped && dst_name.is_some_and(|name| name != src_name) {
			return None;
		}

		let src_parts: Vec<&str> = src_name.split('$').collect();
		let dst_parts: Vec<&str> = dst_name.map_or_else(|| src_parts.clone(), |name| name.split('$').collect());
		if src_parts.len() != dst_parts.len() {
			trace!("can't line up {dst_name:?} with the nesting of {src_name:?}");
			return None;
		}

		for pos in (0..src_parts.len() - 1).rev() {
			if dst_name.is_some() && dst_parts[pos] != src_parts[pos] {
				// that part already got its own name
				continue;
			}

			let outer_src_name = src_parts[..=pos].join("$");
			let Some(outer_dst_name) = self.classes.get(&outer_src_name).and_then(|class| class.info.dst_names.get(id)) else {
				continue;
			};
			if outer_dst_name != outer_src_name {
				let name = std::iter::once(outer_dst_name)
					.chain(dst_parts[pos + 1..].iter().copied())
					.collect::<Vec<_>>()
					.join("$");
				return (dst_name != Some(name.as_str())).then_some(name);
			}
		}
		None
	}
}

#[cfg(test)]
mod testing {
	use anyhow::Result;
	use pretty_assertions::assert_eq;
	use crate::tree::entry::ClassEntry;
	use crate::tree::MappingTree;

	fn tree(classes: &[(&str, Option<&str>)]) -> Result<MappingTree> {
		let mut tree = MappingTree::new();
		tree.set_src_namespace("named")?;
		tree.set_dst_namespaces(vec!["obf".to_owned(), "other".to_owned()])?;
		for &(src, dst) in classes {
			let mut class = ClassEntry::new(src);
			class.info.dst_names.set(0, dst.map(str::to_owned));
			tree.add_class(class);
		}
		Ok(tree)
	}

	fn names(tree: &MappingTree) -> Vec<(&str, Option<&str>)> {
		tree.classes().map(|class| (class.src_name(), class.info.dst_names.get(0))).collect()
	}

	#[test]
	fn unmapped_nested_classes() -> Result<()> {
		let mut tree = tree(&[
			("A$B$C", None),
			("A$B", Some("A$B")),
			("A", Some("a")),
			("X$Y", None),
		])?;

		assert_eq!(tree.propagate_outer_class_names(Some(&["obf"]), false)?, 2);
		assert_eq!(names(&tree), vec![
			("A$B$C", Some("a$B$C")),
			("A$B", Some("a$B")),
			("A", Some("a")),
			("X$Y", None),
		]);
		assert_eq!(tree.propagate_outer_class_names(None, false)?, 0);
		Ok(())
	}

	#[test]
	fn remapped_nested_classes() -> Result<()> {
		let mut tree = tree(&[
			("A", Some("a")),
			("A$B", Some("A$b")),
			("A$B$C", Some("A$B$c")),
		])?;

		assert_eq!(tree.propagate_outer_class_names(None, false)?, 0);

		assert_eq!(tree.propagate_outer_class_names(None, true)?, 2);
		assert_eq!(names(&tree), vec![
			("A", Some("a")),
			("A$B", Some("a$b")),
			("A$B$C", Some("a$b$c")),
		]);

		assert!(tree.propagate_outer_class_names(Some(&["named"]), true).is_err());
		assert!(tree.propagate_outer_class_names(Some(&["unknown"]), true).is_err());
		Ok(())
	}
}
