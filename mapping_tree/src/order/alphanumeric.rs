//! String comparison where runs of ASCII digits compare by their numeric value.
//!
//! `class_9` comes before `class_10`, and leading zeros don't count: `a007` and `a7` compare by the rest of the
//! string, and if that's equal, the shorter one comes first.

use std::cmp::Ordering;

/// Splits into alternating runs of digits and non-digits.
fn chunks(s: &str) -> impl Iterator<Item=&str> + '_ {
	let mut rest = s;
	std::iter::from_fn(move || {
		let first = rest.chars().next()?;
		let numeric = first.is_ascii_digit();
		let end = rest.find(|c: char| c.is_ascii_digit() != numeric).unwrap_or(rest.len());
		let (chunk, tail) = rest.split_at(end);
		rest = tail;
		Some(chunk)
	})
}

fn is_numeric(chunk: &str) -> bool {
	chunk.starts_with(|c: char| c.is_ascii_digit())
}

fn compare_numerically(a: &str, b: &str) -> Ordering {
	let trim = |x: &'_ str| -> usize { x.len() - x.trim_start_matches('0').len().max(1) };
	let a = &a[trim(a)..];
	let b = &b[trim(b)..];
	a.len().cmp(&b.len())
		.then_with(|| a.cmp(b))
}

pub fn compare(a: &str, b: &str) -> Ordering {
	for (x, y) in chunks(a).zip(chunks(b)) {
		let ord = if is_numeric(x) && is_numeric(y) {
			compare_numerically(x, y)
		} else {
			x.cmp(y)
		};
		if ord != Ordering::Equal {
			return ord;
		}
	}
	a.len().cmp(&b.len())
}

/// Shorter strings first, and equally long ones [alphanumerically][compare].
pub fn compare_short_first(a: &str, b: &str) -> Ordering {
	a.len().cmp(&b.len())
		.then_with(|| compare(a, b))
}

/// Compares class names component by component, split at `$`, so that nested classes follow their outer class.
///
/// An outer class comes before its nested classes.
pub fn compare_nest_aware(a: &str, b: &str, short_first: bool) -> Ordering {
	let mut a_parts = a.split('$');
	let mut b_parts = b.split('$');
	loop {
		match (a_parts.next(), b_parts.next()) {
			(Some(x), Some(y)) => {
				let ord = if short_first { compare_short_first(x, y) } else { compare(x, y) };
				if ord != Ordering::Equal {
					return ord;
				}
			},
			(None, None) => return Ordering::Equal,
			(None, Some(_)) => return Ordering::Less,
			(Some(_), None) => return Ordering::Greater,
		}
	}
}

/// Missing values last, others [alphanumerically][compare].
pub fn compare_missing_last(a: Option<&str>, b: Option<&str>) -> Ordering {
	match (a, b) {
		(Some(a), Some(b)) => compare(a, b),
		(Some(_), None) => Ordering::Less,
		(None, Some(_)) => Ordering::Greater,
		(None, None) => Ordering::Equal,
	}
}
