use anyhow::{bail, Result};
use log::debug;
use crate::error::MappingError;
use crate::tree::MappingTree;

impl MappingTree {
	/// Renames the source namespace, returning the old name.
	///
	/// Making one of the destination namespaces the source namespace would need every name and descriptor to be
	/// recomputed from that namespace's point of view, and fails with [`MappingError::UnsupportedNamespaceSwap`].
	pub fn set_src_namespace(&mut self, namespace: &str) -> Result<Option<String>> {
		if self.dst_namespaces.iter().any(|x| x == namespace) {
			bail!(MappingError::UnsupportedNamespaceSwap { namespace: namespace.to_owned() });
		}
		debug!("renaming source namespace {:?} to {namespace:?}", self.src_namespace);
		Ok(self.src_namespace.replace(namespace.to_owned()))
	}

	/// Sets the destination namespaces, returning the old ones.
	///
	/// If every namespace of the new list either keeps its position or is a new name, the slots keep their names: a
	/// new name at a position the old list had is a rename of that slot, further new names get empty slots, and slots
	/// past the end of the new list are dropped.
	///
	/// Otherwise the names of a namespace present in both lists move along with it, and new names start out empty.
	/// Names of namespaces not in the new list are dropped, and so are the pending entries that only know a name in
	/// such a namespace.
	pub fn set_dst_namespaces(&mut self, namespaces: Vec<String>) -> Result<Vec<String>> {
		for (index, namespace) in namespaces.iter().enumerate() {
			if self.src_namespace.as_ref() == Some(namespace) {
				bail!(MappingError::NamespaceCollision { namespace: namespace.clone() });
			}
			if namespaces[..index].contains(namespace) {
				bail!(MappingError::DuplicateDstNamespace { namespace: namespace.clone() });
			}
		}

		// at each new position, the old position to take the names from
		let table: Vec<Option<usize>> = namespaces.iter()
			.map(|namespace| self.dst_namespaces.iter().position(|x| x == namespace))
			.collect();

		let old_len = self.dst_namespaces.len();
		let keeps_slots = table.iter()
			.enumerate()
			.all(|(index, &old)| old.map_or(true, |old| old == index));

		if keeps_slots {
			debug!("relabeling destination namespaces {:?} as {namespaces:?}", self.dst_namespaces);
			if namespaces.len() < old_len {
				// pending entries only known in a dropped slot go away
				let kept: Vec<Option<usize>> = (0..namespaces.len()).map(Some).collect();
				self.pending.remap_dst_names(&kept);
			}
			self.resize_dst_names(namespaces.len());
		} else {
			debug!("moving destination names from {:?} to {namespaces:?}", self.dst_namespaces);
			for class in self.classes.values_mut() {
				class.remap_dst_names(&table);
			}
			self.pending.remap_dst_names(&table);
		}

		Ok(std::mem::replace(&mut self.dst_namespaces, namespaces))
	}
}
