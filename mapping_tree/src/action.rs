//! Operations on a whole tree, through the random-access API.

pub(crate) mod namespaces;
pub(crate) mod propagate_outer_class_names;
