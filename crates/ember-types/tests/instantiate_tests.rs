//! Instantiation, canonical-form and size properties over whole
//! declarations.

use ember_common::DiagnosticBuffer;
use ember_parser::Parser;
use ember_types::{
    ModifierSet, Program, TypeId, bind_type_args, format_type, from_canonical_string,
    size_in_bits, substitute, TypeBinding,
};

fn program_from(src: &str) -> Program {
    let (file, parse_diags) = Parser::new(src).parse_source_file();
    assert!(parse_diags.is_empty(), "parse failed: {parse_diags:?}");
    let mut program = Program::new();
    let mut diagnostics = DiagnosticBuffer::new();
    program.declare_source_file(&file, "test.em", &mut diagnostics);
    assert!(
        diagnostics.is_empty(),
        "declarations failed: {:?}",
        diagnostics.diagnostics()
    );
    program
}

#[test]
fn variant_names_include_bindings() {
    let program = program_from("type Map<'k,'v> = ('k, 'v)*, usz");
    let types = &program.types;
    let map = types.data_by_name("Map");
    let bound = bind_type_args(types, map, &[TypeId::I32, TypeId::BOOL]);
    assert_eq!(format_type(types, bound), "Map<i32,bool>");
    // The parent declaration still prints bare.
    assert_eq!(format_type(types, map), "Map");
}

#[test]
fn canonical_form_round_trips_for_declared_types() {
    let program = program_from("type Pair = i32, i32\ntype Wrap<'e> = 'e*");
    let types = &program.types;

    let samples = [
        types.data_by_name("Pair"),
        bind_type_args(types, types.data_by_name("Wrap"), &[TypeId::C32]),
        types.ptr_to(types.data_by_name("Pair")),
        types.tuple(vec![types.data_by_name("Pair"), TypeId::BOOL]),
    ];
    for &ty in &samples {
        let printed = format_type(types, ty);
        let reparsed = from_canonical_string(types, &printed)
            .unwrap_or_else(|e| panic!("reparse of `{printed}`: {e}"));
        assert_eq!(reparsed, ty, "`{printed}` must round-trip");
    }
}

#[test]
fn substitution_commutes_with_interning() {
    let program = program_from("type Wrap<'e> = 'e*");
    let types = &program.types;

    let e = types.type_var("'e");
    let graph = types.tuple(vec![e, types.ptr_to(e)]);
    let bindings = vec![TypeBinding::new("'e", TypeId::I64)];

    let bound = substitute(types, graph, &bindings);
    let direct = types.tuple(vec![TypeId::I64, types.ptr_to(TypeId::I64)]);
    assert_eq!(bound, direct);
    // Substituting an already-closed graph is the identity.
    assert_eq!(substitute(types, bound, &bindings), bound);
}

#[test]
fn variant_members_are_substituted_copies() {
    let program = program_from("type Maybe<'t> = | None | Some 't");
    let types = &program.types;

    let maybe = types.data_by_name("Maybe");
    let bound = bind_type_args(types, maybe, &[TypeId::I32]);
    let did = types.data_id_of(bound).unwrap();
    types.with_data(did, |def| {
        assert!(def.is_variant());
        assert_eq!(def.members, vec![TypeId::USZ, TypeId::I32]);
        assert_eq!(def.tag_value("Some"), Some(1));
    });
}

#[test]
fn tagged_union_size_is_largest_variant() {
    // On a 64-bit target the bare tag word of None dominates Some's i32.
    let program = program_from("type Maybe<'t> = | None | Some 't");
    let types = &program.types;
    let bound = bind_type_args(types, types.data_by_name("Maybe"), &[TypeId::I32]);
    assert_eq!(size_in_bits(types, &program.scope, bound, false), Ok(64));

    let wide = bind_type_args(
        types,
        types.data_by_name("Maybe"),
        &[types.tuple(vec![TypeId::I64, TypeId::I64])],
    );
    assert_eq!(size_in_bits(types, &program.scope, wide, false), Ok(128));
}

#[test]
fn record_size_is_additive() {
    let program = program_from("type Point = f64, f64\ntype Cell = Point, bool");
    let types = &program.types;
    let point = types.data_by_name("Point");
    assert_eq!(size_in_bits(types, &program.scope, point, false), Ok(128));
    let cell = types.data_by_name("Cell");
    assert_eq!(size_in_bits(types, &program.scope, cell, false), Ok(129));
}

#[test]
fn modifier_set_invariants_hold() {
    let program = program_from("type Point = f64, f64");
    let types = &program.types;
    let point = types.data_by_name("Point");
    let set = ModifierSet::MUT | ModifierSet::GLOBAL;

    let modified = types.with_modifier_set(point, set);
    assert_eq!(types.modifiers(modified), set);
    assert_eq!(types.with_modifier_set(modified, set), modified, "idempotent");
    assert_eq!(types.with_modifier_set(modified, ModifierSet::empty()), point);

    // Members of the modified form carry the set.
    for member in types.projected_members(modified) {
        assert_eq!(types.modifiers(member), set);
    }

    // A function's signature is untouched.
    let f = types.function(TypeId::I32, vec![point, TypeId::BOOL], false);
    let mut_f = types.with_modifier_set(f, ModifierSet::MUT);
    assert_eq!(types.projected_members(mut_f), types.projected_members(f));
}

#[test]
fn recursive_list_instantiates_finitely() {
    let program = program_from("type Node<'e> = 'e, Node<'e>*");
    let types = &program.types;
    let node = types.data_by_name("Node");
    let bound = bind_type_args(types, node, &[TypeId::I32]);
    let did = types.data_id_of(bound).unwrap();
    types.with_data(did, |def| {
        assert_eq!(def.members.len(), 2);
    });
    // The self-referential member points back at the same variant.
    let members = types.with_data(did, |def| def.members.clone());
    assert_eq!(members[0], TypeId::I32);
    assert_eq!(format_type(types, members[1]), "Node<i32>*");
}
