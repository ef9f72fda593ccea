/// Errors a caller may want to tell apart from other failures.
///
/// These are always returned wrapped in an [`anyhow::Error`]. Use [`anyhow::Error::downcast_ref`] to get them back.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum MappingError {
	#[error("namespace {namespace:?} is present on both source and destination side simultaneously")]
	NamespaceCollision { namespace: String },

	#[error("destination namespace {namespace:?} is given more than once")]
	DuplicateDstNamespace { namespace: String },

	#[error("can't make existing destination namespace {namespace:?} the source namespace, swapping requires a dedicated transformation")]
	UnsupportedNamespaceSwap { namespace: String },

	#[error("can't merge with disassociated source namespace {namespace:?}, it must already be a namespace of the tree")]
	DisassociatedSrcNamespace { namespace: String },

	#[error("unknown namespace {namespace:?}")]
	UnknownNamespace { namespace: String },

	#[error("{element} was declared twice in immediate succession")]
	DuplicateDeclaration { element: String },

	#[error("{element} got a second comment in the same pass")]
	DuplicateComment { element: String },

	#[error("can't change the source name of {element} to {name:?}")]
	SrcNameChange { element: String, name: String },

	#[error("conflicting name and descriptor after changing descriptor of {element} to {desc:?}")]
	ConflictingDescriptor { element: String, desc: String },

	#[error("consumer requires a source descriptor, but {element} has none")]
	MissingSrcDescriptor { element: String },

	#[error("visitor still requested another pass after {max} passes")]
	TooManyPasses { max: usize },
}
