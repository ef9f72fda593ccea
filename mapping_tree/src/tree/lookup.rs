//! Identity resolution for members, arguments and variables.
//!
//! Members can come with a full descriptor, a partial one (only the parameter types) or none at all, and all three
//! kinds may be present in the same class at once. Lookups and merges tolerate that by falling back from exact key
//! matches to name and descriptor prefix matches.

use anyhow::{bail, Result};
use indexmap::IndexMap;
use crate::remapper::ClassRemapper;
use crate::tree::entry::{conflicting_desc, is_better_desc, is_full_desc, is_partial_desc, ArgEntry, DescPresence, Member, MemberKey, VarEntry};
use crate::tree::names::Namespace;

/// Finds the index of the member matching `name` and `desc`, given which descriptor shapes the members have.
pub(crate) fn find_member<T: Member>(members: &IndexMap<MemberKey, T>, presence: DescPresence, name: &str, desc: Option<&str>) -> Option<usize> {
	let exact = |desc: Option<&str>| members.get_index_of(&MemberKey::new(name, desc));

	match desc {
		None => {
			if presence.misses_any_desc {
				if let Some(index) = exact(None) {
					return Some(index);
				}
			}
			if presence.has_any_desc {
				return members.values().position(|member| member.src_name() == name);
			}
		},
		Some(desc) if is_partial_desc(desc) => {
			if presence.misses_any_desc {
				if let Some(index) = exact(Some(desc)).or_else(|| exact(None)) {
					return Some(index);
				}
			}
			if presence.has_any_desc {
				return members.values().position(|member| {
					member.src_name() == name && member.src_desc().is_some_and(|x| x.starts_with(desc))
				});
			}
		},
		Some(desc) => {
			if presence.has_any_desc {
				if let Some(index) = exact(Some(desc)) {
					return Some(index);
				}
			}
			if presence.misses_any_desc {
				if let Some(index) = exact(None) {
					return Some(index);
				}
				if desc.contains(')') {
					return members.values().position(|member| {
						member.src_name() == name && member.src_desc().is_some_and(|x| desc.starts_with(x))
					});
				}
			}
		},
	}

	None
}

/// Inserts a member, or merges it into the one it describes, returning the index of the stored member.
///
/// A member with a full descriptor takes over one with the same name and no descriptor. A member without a full
/// descriptor merges into one whose descriptor it is a prefix of.
pub(crate) fn add_member<T: Member>(members: &mut IndexMap<MemberKey, T>, presence: &mut DescPresence, member: T) -> usize {
	let key = member.key().clone();

	if let Some(index) = members.get_index_of(&key) {
		members[index].copy_from(&member, true);
		return index;
	}

	if is_full_desc(key.desc.as_deref()) {
		presence.has_any_desc = true;

		if presence.misses_any_desc {
			if let Some(mut existing) = members.shift_remove(&MemberKey::new(&key.name, None)) {
				existing.set_key(key.clone());
				existing.copy_from(&member, true);
				return members.insert_full(key, existing).0;
			}
		}

		members.insert_full(key, member).0
	} else {
		if presence.has_any_desc {
			let found = members.values().position(|existing| {
				existing.src_name() == key.name && match (key.desc.as_deref(), existing.src_desc()) {
					(None, _) => true,
					(Some(desc), Some(existing)) => existing.starts_with(desc),
					(Some(_), None) => false,
				}
			});
			if let Some(index) = found {
				members[index].copy_from(&member, true);
				return index;
			}
		}

		presence.misses_any_desc = true;
		members.insert_full(key, member).0
	}
}

/// Changes the descriptor of the member at `index`, moving it to the end. Returns the new index.
pub(crate) fn set_member_desc<T: Member>(members: &mut IndexMap<MemberKey, T>, presence: &mut DescPresence, index: usize, desc: Option<&str>)
		-> Result<usize> {
	let Some((key, _)) = members.get_index(index) else {
		bail!("no member at index {index}, only have {}", members.len());
	};
	if key.desc.as_deref() == desc {
		return Ok(index);
	}

	let new_key = MemberKey::new(&key.name, desc);
	if members.contains_key(&new_key) {
		bail!(conflicting_desc(key, desc));
	}

	let Some((_, mut member)) = members.shift_remove_index(index) else {
		bail!("no member at index {index}");
	};
	member.set_key(new_key.clone());
	presence.record(desc);
	Ok(members.insert_full(new_key, member).0)
}

/// Merges a member from another class, upgrading the descriptor of the matching member if the new one tells more.
pub(crate) fn merge_member<T: Member>(members: &mut IndexMap<MemberKey, T>, presence: &mut DescPresence, member: T, replace: bool) -> usize {
	let Some(mut index) = find_member(members, *presence, member.src_name(), member.src_desc()) else {
		return add_member(members, presence, member);
	};

	if is_better_desc(member.src_desc(), members[index].src_desc()) {
		// a conflicting member already holds the better descriptor, the data still goes to the one we found
		if let Ok(new_index) = set_member_desc(members, presence, index, member.src_desc()) {
			index = new_index;
		}
	}

	members[index].copy_from(&member, replace);
	index
}

/// Whether two descriptors may describe the same member, that is, they're equal, or one is a partial descriptor and
/// the start of the other one.
pub(crate) fn is_desc_compatible(a: &str, b: &str) -> bool {
	a == b || is_partial_desc(a) && b.starts_with(a) || is_partial_desc(b) && a.starts_with(b)
}

/// Finds a member by its name and descriptor in any namespace.
///
/// `remapper` maps from the source namespace to `namespace`, for computing the descriptors of the members there.
/// A missing descriptor on either side matches.
pub(crate) fn find_member_in<T: Member>(
	members: &IndexMap<MemberKey, T>,
	name: &str,
	desc: Option<&str>,
	namespace: Namespace,
	remapper: &impl ClassRemapper,
) -> Result<Option<usize>> {
	for (index, member) in members.values().enumerate() {
		if member.name(namespace) != Some(name) {
			continue;
		}
		if let (Some(desc), Some(src_desc)) = (desc, member.src_desc()) {
			let member_desc = match namespace {
				Namespace::Src => src_desc.to_owned(),
				Namespace::Dst(_) => remapper.map_desc(src_desc)?,
			};
			if !is_desc_compatible(desc, &member_desc) {
				continue;
			}
		}
		return Ok(Some(index));
	}
	Ok(None)
}

fn names_conflict(a: Option<&str>, b: Option<&str>) -> bool {
	matches!((a, b), (Some(a), Some(b)) if a != b)
}

/// Finds an argument by position or lv index, skipping ones with a conflicting name in `namespace`. Falls back to
/// matching the name, if the indices are unknown on one of the sides.
pub(crate) fn find_arg(args: &[ArgEntry], position: Option<u32>, lv_index: Option<u32>, name: Option<&str>, namespace: Namespace) -> Option<usize> {
	if position.is_some() || lv_index.is_some() {
		for (index, arg) in args.iter().enumerate() {
			if position.is_some() && arg.position == position || lv_index.is_some() && arg.lv_index == lv_index {
				if names_conflict(name, arg.name(namespace)) {
					continue;
				}
				return Some(index);
			}
		}
	}

	let name = name?;
	args.iter().position(|arg| {
		arg.name(namespace) == Some(name) &&
			(position.is_none() || arg.position.is_none()) &&
			(lv_index.is_none() || arg.lv_index.is_none())
	})
}

fn idx(x: Option<u32>) -> i64 {
	x.map_or(-1, i64::from)
}

/// Finds a variable.
///
/// Tries the lvt row index first, then the lv index where the op ranges overlap, preferring an equal start or else
/// the nearest one, and finally the name, if the indices are unknown on one of the sides.
pub(crate) fn find_var(
	vars: &[VarEntry],
	lvt_row_index: Option<u32>,
	lv_index: Option<u32>,
	start_op_idx: Option<u32>,
	end_op_idx: Option<u32>,
	name: Option<&str>,
	namespace: Namespace,
) -> Option<usize> {
	let (row, lv, start, end) = (idx(lvt_row_index), idx(lv_index), idx(start_op_idx), idx(end_op_idx));

	if row >= 0 {
		let mut has_missing = false;
		for (index, var) in vars.iter().enumerate() {
			let var_row = idx(var.lvt_row_index);
			if var_row == row {
				return Some(index);
			} else if var_row < 0 {
				has_missing = true;
			}
		}
		if !has_missing {
			return None;
		}
	}

	if lv >= 0 {
		let mut has_missing = false;
		let mut best_match: Option<usize> = None;

		for (index, var) in vars.iter().enumerate() {
			let (var_row, var_lv, var_start, var_end) = (idx(var.lvt_row_index), idx(var.lv_index), idx(var.start_op_idx), idx(var.end_op_idx));

			if row >= 0 && var_row >= 0 && row != var_row || names_conflict(name, var.name(namespace)) {
				continue;
			}

			if var_lv != lv {
				if var_lv < 0 {
					has_missing = true;
				}
				continue;
			}

			if start >= 0 && end >= 0 && var_start >= 0 && var_end >= 0 {
				if start >= var_end || end <= var_start {
					continue;
				}
				return Some(index);
			}

			// a full range on one side that doesn't fit the other
			if end >= 0 && var_start >= 0 && end <= var_start || var_end >= 0 && start >= 0 && var_end <= start {
				continue;
			}

			if start < 0 || start == var_start {
				return Some(index);
			}

			let closer = match best_match {
				None => true,
				Some(best) => var_start >= 0 && (var_start - start).abs() < (idx(vars[best].start_op_idx) - start).abs(),
			};
			if closer {
				best_match = Some(index);
			}
		}

		if !has_missing || best_match.is_some() {
			return best_match;
		}
	}

	let name = name?;
	vars.iter().position(|var| {
		var.name(namespace) == Some(name) &&
			(row < 0 || var.lvt_row_index.is_none()) &&
			(lv < 0 || var.lv_index.is_none())
	})
}
