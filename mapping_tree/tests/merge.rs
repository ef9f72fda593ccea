use anyhow::Result;
use pretty_assertions::assert_eq;
use mapping_tree::{MappingError, MappingTree};
use mapping_tree::order::VisitOrder;
use mapping_tree::tree::entry::{ArgEntry, FieldEntry, MetadataEntry, MethodEntry, VarEntry};
use mapping_tree::tree::names::{DstNames, Namespace};

mod common;

fn rich_tree(with_metadata: bool) -> Result<MappingTree> {
	let mut tree = common::tree("official", &["intermediary", "named"])?;
	if with_metadata {
		tree.add_metadata(MetadataEntry::new("title", Some("test")));
		tree.add_metadata(MetadataEntry::new("escaped-names", None));
	}

	let a = tree.add_class(common::class("a", &[Some("class_1"), Some("pkg/Main")]));
	a.info.comment = Some("The main class.".to_owned());

	let mut field = FieldEntry::new("a", Some("La;"));
	field.info.dst_names = DstNames::from([Some("field_1"), Some("INSTANCE")]);
	a.add_field(field);
	a.add_field(FieldEntry::new("b", Some("I")));

	let mut method = MethodEntry::new("b", Some("(ILa$a;)V"));
	method.info.dst_names = DstNames::from([Some("method_2"), Some("run")]);
	method.info.comment = Some("Runs it.".to_owned());
	let mut arg = ArgEntry::new(Some(0), Some(1), None);
	arg.info.dst_names.set(1, Some("count".to_owned()));
	method.add_arg(arg);
	let mut arg = ArgEntry::new(Some(1), Some(2), None);
	arg.info.dst_names.set(1, Some("inner".to_owned()));
	arg.info.comment = Some("An inner thing.".to_owned());
	method.add_arg(arg);
	let mut var = VarEntry::new(Some(0), Some(3), Some(5), None, None);
	var.info.dst_names.set(1, Some("local".to_owned()));
	method.add_var(var);
	a.add_method(method);

	tree.add_class(common::class("a$a", &[Some("class_1$class_2"), Some("pkg/Main$Inner")]));
	tree.add_class(common::class("b", &[Some("class_3"), None]));

	Ok(tree)
}

#[test]
fn round_trip() -> Result<()> {
	let tree = rich_tree(true)?;

	for order in [
		VisitOrder::by_input_order(),
		VisitOrder::by_name(),
		VisitOrder::by_name().methods_first(true).method_vars_first(true),
		VisitOrder::default().classes_by_src_name_short_first().fields_by_src_name_desc_short_first(),
	] {
		let mut copy = MappingTree::new();
		tree.accept(&mut copy, &order)?;
		assert_eq!(copy, tree, "order: {order:?}");
	}
	Ok(())
}

#[test]
fn merge_is_idempotent() -> Result<()> {
	let source = rich_tree(false)?;

	let mut once = MappingTree::new();
	source.accept(&mut once, &VisitOrder::default())?;

	let mut twice = MappingTree::new();
	source.accept(&mut twice, &VisitOrder::default())?;
	source.accept(&mut twice, &VisitOrder::by_name())?;

	assert_eq!(twice, once);
	assert_eq!(twice.classes().count(), 3);
	let method = twice.method("a", "b", None);
	assert_eq!(method.map(|m| (m.args().len(), m.vars().len())), Some((2, 1)));
	Ok(())
}

#[test]
fn alternate_key_merge() -> Result<()> {
	let mut tree = common::tree("ns1", &["ns2"])?;
	let a = tree.add_class(common::class("A", &[Some("A2")]));
	let mut field = FieldEntry::new("f", Some("LA;"));
	field.info.dst_names.set(0, Some("f2".to_owned()));
	a.add_field(field);

	let mut pass = common::tree("ns2", &["ns3"])?;
	let a2 = pass.add_class(common::class("A2", &[Some("A3")]));
	let mut field = FieldEntry::new("f2", Some("LA2;"));
	field.info.dst_names.set(0, Some("f3".to_owned()));
	a2.add_field(field);

	pass.accept(&mut tree, &VisitOrder::default())?;

	assert_eq!(tree.dst_namespaces(), &["ns2".to_owned(), "ns3".to_owned()]);
	assert_eq!(tree.classes().count(), 1);
	assert_eq!(tree.class("A").map(|c| c.info.dst_names.clone()), Some(DstNames::from([Some("A2"), Some("A3")])));
	assert_eq!(tree.field("A", "f", Some("LA;")).map(|f| f.info.dst_names.clone()), Some(DstNames::from([Some("f2"), Some("f3")])));

	assert_eq!(tree.map_desc("LA;", Namespace::Src, Namespace::Dst(1))?, "LA3;");
	assert_eq!(tree.pending_len(), 0);
	Ok(())
}

/// A starting tree, a pass from `ns2` naming class `A2` and its members, and a pass from `ns1` telling that `A2` is `A`.
fn pending_passes() -> Result<(MappingTree, MappingTree, MappingTree)> {
	let mut start = common::tree("ns1", &["ns2"])?;
	start.add_class(common::class("Other", &[Some("O2")]));

	let mut alt = common::tree("ns2", &["ns3"])?;
	let a2 = alt.add_class(common::class("A2", &[Some("A3")]));
	let mut field = FieldEntry::new("f2", Some("LA2;"));
	field.info.dst_names.set(0, Some("f3".to_owned()));
	a2.add_field(field);
	let mut method = MethodEntry::new("m2", Some("(LA2;)V"));
	method.info.dst_names.set(0, Some("m3".to_owned()));
	let mut arg = ArgEntry::new(Some(0), None, Some("x2"));
	arg.info.dst_names.set(0, Some("x3".to_owned()));
	method.add_arg(arg);
	a2.add_method(method);

	let mut src = common::tree("ns1", &["ns2"])?;
	let a = src.add_class(common::class("A", &[Some("A2")]));
	let mut field = FieldEntry::new("f", Some("LA;"));
	field.info.dst_names.set(0, Some("f2".to_owned()));
	a.add_field(field);
	let mut method = MethodEntry::new("m", Some("(LA;)V"));
	method.info.dst_names.set(0, Some("m2".to_owned()));
	a.add_method(method);

	Ok((start, alt, src))
}

#[test]
fn pending_resolution_in_both_orders() -> Result<()> {
	let (start, alt, src) = pending_passes()?;

	let mut alt_first = start.clone();
	alt.accept(&mut alt_first, &VisitOrder::default())?;
	// the tree can't know yet where `A2` belongs
	assert_eq!(alt_first.class("A"), None);
	assert_eq!(alt_first.pending_len(), 3);
	src.accept(&mut alt_first, &VisitOrder::default())?;
	assert_eq!(alt_first.pending_len(), 0);

	let mut src_first = start;
	src.accept(&mut src_first, &VisitOrder::default())?;
	alt.accept(&mut src_first, &VisitOrder::default())?;
	assert_eq!(src_first.pending_len(), 0);

	assert_eq!(alt_first, src_first);

	let tree = alt_first;
	assert_eq!(tree.class("A").map(|c| c.info.dst_names.clone()), Some(DstNames::from([Some("A2"), Some("A3")])));
	assert_eq!(tree.field("A", "f", Some("LA;")).map(|f| f.info.dst_names.clone()), Some(DstNames::from([Some("f2"), Some("f3")])));
	let method = tree.method("A", "m", Some("(LA;)V"));
	assert_eq!(method.map(|m| m.info.dst_names.clone()), Some(DstNames::from([Some("m2"), Some("m3")])));
	let arg = method.and_then(|m| m.arg(Some(0), None, None));
	assert_eq!(arg.map(|a| (a.name(Namespace::Src), a.name(Namespace::Dst(0)), a.name(Namespace::Dst(1)))), Some((None, Some("x2"), Some("x3"))));
	Ok(())
}

#[test]
fn discard_pending() -> Result<()> {
	let (mut tree, alt, _) = pending_passes()?;
	alt.accept(&mut tree, &VisitOrder::default())?;

	assert_eq!(tree.discard_pending(), 3);
	assert_eq!(tree.pending_len(), 0);
	assert_eq!(tree.classes().count(), 1);
	Ok(())
}

#[test]
fn descriptor_reconciliation() -> Result<()> {
	let mut tree = common::tree("ns1", &["ns2"])?;
	let a = tree.add_class(common::class("A", &[Some("A2")]));
	let mut field = FieldEntry::new("f", None);
	field.info.dst_names.set(0, Some("f2".to_owned()));
	field.info.comment = Some("kept".to_owned());
	a.add_field(field);
	let mut method = MethodEntry::new("m", Some("(I)"));
	method.info.dst_names.set(0, Some("m2".to_owned()));
	a.add_method(method);

	let mut pass = common::tree("ns1", &["ns2"])?;
	let a = pass.add_class(common::class("A", &[]));
	a.add_field(FieldEntry::new("f", Some("I")));
	a.add_method(MethodEntry::new("m", Some("(I)V")));

	pass.accept(&mut tree, &VisitOrder::default())?;

	let class = tree.class("A");
	assert_eq!(class.map(|c| (c.fields().count(), c.methods().count())), Some((1, 1)));
	let field = tree.field("A", "f", Some("I"));
	assert_eq!(field.map(|f| (f.src_desc(), f.info.comment.as_deref(), f.name(Namespace::Dst(0)))), Some((Some("I"), Some("kept"), Some("f2"))));
	let method = tree.method("A", "m", Some("(I)V"));
	assert_eq!(method.map(|m| (m.src_desc(), m.name(Namespace::Dst(0)))), Some((Some("(I)V"), Some("m2"))));
	Ok(())
}

#[test]
fn descriptor_from_alternate_namespace() -> Result<()> {
	let mut tree = common::tree("ns1", &["ns2"])?;
	let a = tree.add_class(common::class("A", &[Some("A2")]));
	let mut method = MethodEntry::new("m", None);
	method.info.dst_names.set(0, Some("m2".to_owned()));
	a.add_method(method);

	let mut pass = common::tree("ns2", &["ns3"])?;
	let a2 = pass.add_class(common::class("A2", &[Some("A3")]));
	let mut method = MethodEntry::new("m2", Some("(LA2;)V"));
	method.info.dst_names.set(0, Some("m3".to_owned()));
	a2.add_method(method);

	pass.accept(&mut tree, &VisitOrder::default())?;

	assert_eq!(tree.class("A").map(|c| c.methods().count()), Some(1));
	let method = tree.method("A", "m", Some("(LA;)V"));
	assert_eq!(method.map(|m| m.info.dst_names.clone()), Some(DstNames::from([Some("m2"), Some("m3")])));
	assert_eq!(tree.pending_len(), 0);
	Ok(())
}

#[test]
fn args_and_vars_match_by_any_known_index() -> Result<()> {
	let mut tree = common::tree("ns1", &["ns2"])?;
	let a = tree.add_class(common::class("A", &[]));
	let mut method = MethodEntry::new("m", Some("(II)V"));
	method.add_arg(ArgEntry::new(Some(0), None, Some("x")));
	method.add_var(VarEntry::new(None, Some(2), Some(0), None, Some("v")));
	a.add_method(method);

	let mut pass = common::tree("ns1", &["ns2"])?;
	let a = pass.add_class(common::class("A", &[]));
	let mut method = MethodEntry::new("m", Some("(II)V"));
	let mut arg = ArgEntry::new(None, Some(1), Some("x"));
	arg.info.dst_names.set(0, Some("x2".to_owned()));
	method.add_arg(arg);
	let mut var = VarEntry::new(Some(3), Some(2), Some(0), None, None);
	var.info.dst_names.set(0, Some("v2".to_owned()));
	method.add_var(var);
	a.add_method(method);

	pass.accept(&mut tree, &VisitOrder::default())?;

	let method = tree.method("A", "m", None);
	let args: Vec<_> = method.map(|m| m.args().to_vec()).unwrap_or_default();
	let mut expected = ArgEntry::new(Some(0), Some(1), Some("x"));
	expected.info.dst_names.set(0, Some("x2".to_owned()));
	assert_eq!(args, vec![expected]);

	let vars: Vec<_> = method.map(|m| m.vars().to_vec()).unwrap_or_default();
	let mut expected = VarEntry::new(Some(3), Some(2), Some(0), None, Some("v"));
	expected.info.dst_names.set(0, Some("v2".to_owned()));
	assert_eq!(vars, vec![expected]);
	Ok(())
}

#[test]
fn unknown_source_namespace() -> Result<()> {
	let mut tree = rich_tree(true)?;
	let before = tree.clone();

	let pass = common::tree("other", &["named"])?;
	let error = pass.accept(&mut tree, &VisitOrder::default()).unwrap_err();
	assert_eq!(error.downcast_ref::<MappingError>(), Some(&MappingError::DisassociatedSrcNamespace { namespace: "other".to_owned() }));
	assert_eq!(tree, before);
	Ok(())
}

#[test]
fn src_name_change_is_rejected() -> Result<()> {
	let mut tree = common::tree("ns1", &["ns2"])?;
	tree.add_class(common::class("A", &[Some("A2")]));

	// claims that `A2` in ns2 is `B` in ns1
	let mut pass = common::tree("ns2", &["ns1"])?;
	pass.add_class(common::class("A2", &[Some("B")]));

	let error = pass.accept(&mut tree, &VisitOrder::default()).unwrap_err();
	assert!(matches!(error.downcast_ref::<MappingError>(), Some(MappingError::SrcNameChange { .. })));
	Ok(())
}
