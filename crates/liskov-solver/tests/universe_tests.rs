use super::*;
use crate::test_fixtures::fixture;

fn names(u: &TypeUniverse, types: &[TypeId]) -> Vec<String> {
    types.iter().map(|ty| u.display(*ty)).collect()
}

// =============================================================================
// Declarations
// =============================================================================

#[test]
fn test_declare_plain_and_generic() {
    let u = TypeUniverse::new();
    let animal = u.declare_class("Animal", &[]).expect("declares");
    let list = u.declare_class("List", &["T"]).expect("declares");

    assert!(matches!(u.data(animal), Some(TypeData::Named(_))));
    assert!(!u.is_generic(animal));

    // A generic declaration's own type is its open definition.
    assert!(u.is_generic(list));
    assert_eq!(u.generic_definition(list), Some(list));
    let args = u.generic_arguments(list);
    assert_eq!(args.len(), 1);
    assert!(u.is_generic_parameter(args[0]));
    assert!(u.contains_generic_parameters(list));

    assert_eq!(u.lookup("Animal"), Some(animal));
    assert_eq!(u.lookup("List"), Some(list));
    assert_eq!(u.lookup("Horse"), None);
    assert_eq!(u.definitions().len(), 2);
}

#[test]
fn test_debug_reports_sizes() {
    let u = TypeUniverse::new();
    assert_eq!(format!("{u:?}"), "TypeUniverse { definitions: 0, types: 0, .. }");

    u.declare_class("Animal", &[]).expect("declares");
    u.declare_class("List", &["T"]).expect("declares");
    let rendered = format!("{u:?}");
    assert!(rendered.starts_with("TypeUniverse { definitions: 2, types: "), "{rendered}");
}

#[test]
fn test_declare_duplicate_name() {
    let u = TypeUniverse::new();
    u.declare_class("Dog", &[]).expect("declares");
    let err = u.declare_interface("Dog", &[]).expect_err("duplicate");
    assert_eq!(err, UniverseError::DuplicateName("Dog".to_string()));
    assert_eq!(err.to_string(), "type `Dog` is already declared");
}

#[test]
fn test_declare_ignores_prefilled_supertypes() {
    let u = TypeUniverse::new();
    let mut info = DefinitionInfo::class("Dog", &["T"]);
    info.extends = Some(TypeId(42));
    info.implements.push(TypeId(43));
    info.type_params[0].constraints.push(TypeId(44));
    let dog = u.declare(info).expect("declares");

    assert_eq!(u.base_type(dog), None);
    assert!(u.declared_interfaces(dog).is_empty());
    let param = u.parameter(dog, 0).expect("parameter");
    assert!(u.parameter_constraints(param).is_empty());
}

#[test]
fn test_parameters() {
    let u = TypeUniverse::new();
    let map = u.declare_interface("Map", &["K", "V"]).expect("declares");
    let animal = u.declare_class("Animal", &[]).expect("declares");

    let k = u.parameter(map, 0).expect("K");
    let v = u.parameter_named(map, "V").expect("V");
    assert_ne!(k, v);
    assert_eq!(u.generic_arguments(map).as_slice(), &[k, v]);
    assert_eq!(u.display(v), "V");

    assert!(matches!(
        u.parameter(map, 2),
        Err(UniverseError::ParameterOutOfRange { index: 2, .. })
    ));
    assert!(matches!(
        u.parameter_named(map, "X"),
        Err(UniverseError::UnknownParameter { .. })
    ));
    assert_eq!(
        u.parameter(animal, 0),
        Err(UniverseError::NotGeneric("Animal".to_string()))
    );
    assert!(matches!(
        u.parameter(k, 0),
        Err(UniverseError::NotADeclaration(_))
    ));
}

#[test]
fn test_apply_interns() {
    let f = fixture();
    let u = &f.u;

    let a = u.apply(f.list, &[f.dog]).expect("List<Dog>");
    let b = u.apply(f.list, &[f.dog]).expect("List<Dog>");
    assert_eq!(a, b);
    assert_ne!(a, u.apply(f.list, &[f.cat]).expect("List<Cat>"));

    assert!(u.is_generic(a));
    assert_eq!(u.generic_definition(a), Some(f.list));
    assert_eq!(u.generic_arguments(a).as_slice(), &[f.dog]);
    assert!(!u.contains_generic_parameters(a));

    // Applying a definition to its own parameters yields the definition.
    let t = f.param(f.list, 0);
    assert_eq!(u.apply(f.list, &[t]).expect("List<T>"), f.list);
}

#[test]
fn test_apply_errors() {
    let f = fixture();
    let u = &f.u;

    assert_eq!(
        u.apply(f.dictionary, &[f.dog]),
        Err(UniverseError::ArityMismatch {
            name: "Dictionary".to_string(),
            expected: 2,
            found: 1,
        })
    );
    assert_eq!(
        u.apply(f.dog, &[f.cat]),
        Err(UniverseError::NotGeneric("Dog".to_string()))
    );
    assert_eq!(
        u.apply(f.list, &[TypeId(9_999)]),
        Err(UniverseError::UnknownType(TypeId(9_999)))
    );
    assert_eq!(
        u.apply(TypeId(9_999), &[f.dog]),
        Err(UniverseError::UnknownType(TypeId(9_999)))
    );
}

#[test]
fn test_partially_open_application() {
    let f = fixture();
    let u = &f.u;
    let v = f.param(f.dictionary, 1);

    let partial = f.app(f.dictionary, &[f.int32, v]);
    assert_ne!(partial, f.dictionary);
    assert!(u.contains_generic_parameters(partial));
    assert_eq!(u.display(partial), "Dictionary<Int32, V>");
}

// =============================================================================
// Supertypes and constraints
// =============================================================================

#[test]
fn test_set_base_validation() {
    let f = fixture();
    let u = &f.u;

    assert_eq!(
        u.set_base(f.ientity, f.object),
        Err(UniverseError::InterfaceBase("IEntityType".to_string()))
    );
    assert!(matches!(
        u.set_base(f.dog, f.ientity),
        Err(UniverseError::InvalidBase { .. })
    ));
    assert_eq!(
        u.set_base(f.dog, TypeId(9_999)),
        Err(UniverseError::UnknownType(TypeId(9_999)))
    );
    // Only the declaration's own type can be given a base.
    let list_dog = f.app(f.list, &[f.dog]);
    assert!(matches!(
        u.set_base(list_dog, f.object),
        Err(UniverseError::NotADeclaration(_))
    ));
}

#[test]
fn test_set_base_rejects_cycles() {
    let f = fixture();
    let u = &f.u;

    assert!(matches!(
        u.set_base(f.animal, f.dog),
        Err(UniverseError::InheritanceCycle { .. })
    ));
    assert!(matches!(
        u.set_base(f.dog, f.dog),
        Err(UniverseError::InheritanceCycle { .. })
    ));
    // The rejected edge left the chain intact.
    assert_eq!(u.base_type(f.animal), Some(f.object));
}

#[test]
fn test_add_interface_validation() {
    let f = fixture();
    let u = &f.u;

    assert_eq!(
        u.add_interface(f.dog, f.animal),
        Err(UniverseError::NotAnInterface("Animal".to_string()))
    );
    let foreign = f.param(f.dictionary, 0);
    let bad = f.app(f.ienumerable, &[foreign]);
    assert!(matches!(
        u.add_interface(f.list, bad),
        Err(UniverseError::ForeignParameter { .. })
    ));
    let icollection_t = f.app(f.icollection, &[f.param(f.ienumerable, 0)]);
    assert!(matches!(
        u.add_interface(f.ienumerable, icollection_t),
        Err(UniverseError::InheritanceCycle { .. })
    ));
}

#[test]
fn test_add_interface_deduplicates() {
    let f = fixture();
    let u = &f.u;

    u.add_interface(f.entity, f.ientity).expect("already present");
    assert_eq!(u.declared_interfaces(f.entity).as_slice(), &[f.ientity]);
}

#[test]
fn test_add_constraint_validation() {
    let f = fixture();
    let u = &f.u;

    assert!(matches!(
        u.add_constraint(f.dog, f.animal),
        Err(UniverseError::NotAParameter(_))
    ));
    let t = f.param(f.list, 0);
    assert_eq!(
        u.add_constraint(t, TypeId(9_999)),
        Err(UniverseError::UnknownType(TypeId(9_999)))
    );

    u.add_constraint(t, f.animal).expect("adds");
    u.add_constraint(t, f.animal).expect("deduplicates");
    assert_eq!(u.parameter_constraints(t).as_slice(), &[f.animal]);
}

#[test]
fn test_parameter_constraints_in_order() {
    let f = fixture();
    let t = f.param(f.range, 0);
    let expected = [f.app(f.icomparable, &[t]), f.app(f.iequatable, &[t])];
    assert_eq!(f.u.parameter_constraints(t).as_slice(), &expected);
    assert!(f.u.parameter_constraints(f.dog).is_empty());
}

// =============================================================================
// Instantiation
// =============================================================================

#[test]
fn test_base_type_instantiated() {
    let f = fixture();
    let u = &f.u;

    assert_eq!(u.base_type(f.dog), Some(f.animal));
    assert_eq!(u.base_type(f.object), None);
    assert_eq!(
        u.base_type(f.datetime_range),
        Some(f.app(f.range, &[f.datetime]))
    );
    let list_dog = f.app(f.list, &[f.dog]);
    assert_eq!(u.base_type(list_dog), Some(f.object));
}

#[test]
fn test_declared_interfaces_instantiated() {
    let f = fixture();
    let u = &f.u;

    let dict = f.app(f.dictionary, &[f.int32, f.dog]);
    let pair = f.app(f.key_value_pair, &[f.int32, f.dog]);
    assert_eq!(
        u.declared_interfaces(dict).as_slice(),
        &[f.app(f.icollection, &[pair])]
    );
}

#[test]
fn test_instantiate_replaces_only_owner_parameters() {
    let f = fixture();
    let u = &f.u;
    let list_def = u.def_of(f.list).expect("declaration");
    let dict_k = f.param(f.dictionary, 0);
    let t = f.param(f.list, 0);

    let mixed = f.app(f.key_value_pair, &[t, dict_k]);
    let result = u.instantiate(mixed, list_def, &[f.dog]);
    assert_eq!(result, f.app(f.key_value_pair, &[f.dog, dict_k]));

    // Nothing to replace: same handle back.
    let closed = f.app(f.list, &[f.cat]);
    assert_eq!(u.instantiate(closed, list_def, &[f.dog]), closed);
}

// =============================================================================
// Interface closure
// =============================================================================

#[test]
fn test_interfaces_base_chain_first() {
    let f = fixture();
    let expected = [
        "IRange",
        "IComparable<Range<DateTime>>",
        "IEquatable<Range<DateTime>>",
        "IComparable<DateTimeRange>",
        "IEquatable<DateTimeRange>",
    ];
    assert_eq!(names(&f.u, &f.u.interfaces(f.datetime_range)), expected);
}

#[test]
fn test_interfaces_preorder_and_deduplicated() {
    let f = fixture();
    let list_dog = f.app(f.list, &[f.dog]);
    assert_eq!(
        names(&f.u, &f.u.interfaces(list_dog)),
        ["ICollection<Dog>", "IEnumerable<Dog>"]
    );
    let specific = f.u.interfaces(f.specific_entity);
    assert_eq!(
        names(&f.u, &specific),
        ["IGenericEntityType<EntityType>", "IEntityType"]
    );
}

#[test]
fn test_interfaces_of_interface_exclude_itself() {
    let f = fixture();
    let coll = f.app(f.icollection, &[f.dog]);
    assert_eq!(names(&f.u, &f.u.interfaces(coll)), ["IEnumerable<Dog>"]);
}

#[test]
fn test_interfaces_refresh_after_declaration_change() {
    let f = fixture();
    let u = &f.u;
    assert!(u.interfaces(f.dog).is_empty());

    u.add_interface(f.animal, f.ientity).expect("adds");
    assert_eq!(u.interfaces(f.dog), vec![f.ientity]);
}

#[test]
fn test_parameter_supertypes_from_constraints() {
    let f = fixture();
    let u = &f.u;
    let t = f.param(f.list, 0);
    u.add_constraint(t, f.animal).expect("adds");
    u.add_constraint(t, f.ientity).expect("adds");

    assert_eq!(u.base_type(t), Some(f.animal));
    assert_eq!(u.interfaces(t), vec![f.ientity]);
    assert!(u.is_assignable(t, f.object));
    assert!(u.is_assignable(t, f.ientity));
    assert!(!u.is_assignable(t, f.dog));
}

// =============================================================================
// Native assignability
// =============================================================================

#[test]
fn test_is_assignable() {
    let f = fixture();
    let u = &f.u;

    assert!(u.is_assignable(f.dog, f.dog));
    assert!(u.is_assignable(f.dog, f.animal));
    assert!(u.is_assignable(f.dog, f.object));
    assert!(!u.is_assignable(f.animal, f.dog));
    assert!(!u.is_assignable(f.dog, f.cat));

    assert!(u.is_assignable(f.entity, f.ientity));
    assert!(u.is_assignable(f.specific_entity, f.ientity));
    assert!(u.is_assignable(f.datetime, f.value_type));

    // Invariant generics: only exact interface instantiations are assignable.
    let list_dog = f.app(f.list, &[f.dog]);
    assert!(u.is_assignable(list_dog, f.app(f.icollection, &[f.dog])));
    assert!(!u.is_assignable(list_dog, f.app(f.icollection, &[f.animal])));
    assert!(!u.is_assignable(list_dog, f.icollection));

    // Generic parameters are never assignment targets.
    assert!(!u.is_assignable(f.dog, f.param(f.list, 0)));
}

#[test]
fn test_is_interface_and_unknown_handles() {
    let f = fixture();
    let u = &f.u;
    let unknown = TypeId(9_999);

    assert!(u.is_interface(f.icollection));
    assert!(u.is_interface(f.app(f.icollection, &[f.dog])));
    assert!(!u.is_interface(f.list));
    assert!(!u.is_interface(f.param(f.icollection, 0)));

    assert!(!u.is_generic(unknown));
    assert_eq!(u.generic_definition(unknown), None);
    assert!(u.generic_arguments(unknown).is_empty());
    assert_eq!(u.base_type(unknown), None);
    assert!(u.interfaces(unknown).is_empty());
    assert!(!u.is_assignable(unknown, f.object));
    assert_eq!(u.make_generic(unknown, &[f.dog]), None);
}

#[test]
fn test_make_generic() {
    let f = fixture();
    let u = &f.u;

    assert_eq!(
        u.make_generic(f.list, &[f.dog]),
        Some(f.app(f.list, &[f.dog]))
    );
    // Any application names its definition.
    let list_cat = f.app(f.list, &[f.cat]);
    assert_eq!(
        u.make_generic(list_cat, &[f.dog]),
        Some(f.app(f.list, &[f.dog]))
    );
    assert_eq!(u.make_generic(f.list, &[f.dog, f.cat]), None);
    assert_eq!(u.make_generic(f.dog, &[f.cat]), None);
}

#[test]
fn test_concurrent_interning_agrees() {
    use rayon::prelude::*;

    let f = fixture();
    let ids: Vec<TypeId> = (0..64)
        .into_par_iter()
        .map(|i| {
            let element = if i % 2 == 0 { f.dog } else { f.cat };
            let inner = f.app(f.list, &[element]);
            f.app(f.icollection, &[inner])
        })
        .collect();

    let dogs = f.app(f.icollection, &[f.app(f.list, &[f.dog])]);
    let cats = f.app(f.icollection, &[f.app(f.list, &[f.cat])]);
    for (i, id) in ids.iter().enumerate() {
        assert_eq!(*id, if i % 2 == 0 { dogs } else { cats });
    }
}
