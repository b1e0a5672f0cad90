//! Shared sample hierarchy for solver tests.
//!
//! Loosely modeled on a class library with collections, comparable value
//! types, an entity hierarchy and a generic range type:
//!
//! ```text
//! interface IEnumerable<T>
//! interface ICollection<T> : IEnumerable<T>
//! class List<T> : ICollection<T>, IEnumerable<T>
//! struct KeyValuePair<K, V>
//! class Dictionary<K, V> : ICollection<KeyValuePair<K, V>>
//! interface IComparable<T>, IEquatable<T>
//! struct Int32, DateTime : ValueType, IComparable<Self>, IEquatable<Self>
//! interface IEntityType
//! interface IGenericEntityType<T : IEntityType> : IEntityType
//! class EntityType : IEntityType
//! class SpecificEntityType : IGenericEntityType<EntityType>
//! interface IRange
//! class Range<T : IComparable<T>, IEquatable<T>>
//!     : IRange, IComparable<Range<T>>, IEquatable<Range<T>>
//! class DateTimeRange : Range<DateTime>, IComparable<DateTimeRange>, IEquatable<DateTimeRange>
//! interface ISorted<T : IComparable<T>>
//! class Schedule : ISorted<DateTime>
//! class Animal; class Dog : Animal; class Cat : Animal; class Exception
//! ```

use crate::types::TypeId;
use crate::universe::TypeUniverse;

pub(crate) struct Fixture {
    pub u: TypeUniverse,
    pub object: TypeId,
    pub value_type: TypeId,
    pub ienumerable: TypeId,
    pub icollection: TypeId,
    pub list: TypeId,
    pub key_value_pair: TypeId,
    pub dictionary: TypeId,
    pub icomparable: TypeId,
    pub iequatable: TypeId,
    pub int32: TypeId,
    pub datetime: TypeId,
    pub ientity: TypeId,
    pub igeneric_entity: TypeId,
    pub entity: TypeId,
    pub specific_entity: TypeId,
    pub irange: TypeId,
    pub range: TypeId,
    pub datetime_range: TypeId,
    pub isorted: TypeId,
    pub schedule: TypeId,
    pub animal: TypeId,
    pub dog: TypeId,
    pub cat: TypeId,
    pub exception: TypeId,
}

impl Fixture {
    /// `definition<args>`, panicking on malformed fixtures.
    pub fn app(&self, definition: TypeId, args: &[TypeId]) -> TypeId {
        self.u.apply(definition, args).expect("fixture application")
    }

    pub fn param(&self, definition: TypeId, index: usize) -> TypeId {
        self.u.parameter(definition, index).expect("fixture parameter")
    }

    pub fn show(&self, ty: TypeId) -> String {
        self.u.display(ty)
    }
}

pub(crate) fn fixture() -> Fixture {
    let u = TypeUniverse::new();

    let object = u.declare_class("Object", &[]).expect("Object");
    let value_type = u.declare_class("ValueType", &[]).expect("ValueType");
    u.set_base(value_type, object).expect("ValueType base");

    let ienumerable = u.declare_interface("IEnumerable", &["T"]).expect("IEnumerable");
    let icollection = u.declare_interface("ICollection", &["T"]).expect("ICollection");
    let list = u.declare_class("List", &["T"]).expect("List");
    let key_value_pair = u.declare_struct("KeyValuePair", &["K", "V"]).expect("KeyValuePair");
    let dictionary = u.declare_class("Dictionary", &["K", "V"]).expect("Dictionary");
    let icomparable = u.declare_interface("IComparable", &["T"]).expect("IComparable");
    let iequatable = u.declare_interface("IEquatable", &["T"]).expect("IEquatable");
    let int32 = u.declare_struct("Int32", &[]).expect("Int32");
    let datetime = u.declare_struct("DateTime", &[]).expect("DateTime");
    let ientity = u.declare_interface("IEntityType", &[]).expect("IEntityType");
    let igeneric_entity = u
        .declare_interface("IGenericEntityType", &["T"])
        .expect("IGenericEntityType");
    let entity = u.declare_class("EntityType", &[]).expect("EntityType");
    let specific_entity = u
        .declare_class("SpecificEntityType", &[])
        .expect("SpecificEntityType");
    let irange = u.declare_interface("IRange", &[]).expect("IRange");
    let range = u.declare_class("Range", &["T"]).expect("Range");
    let datetime_range = u.declare_class("DateTimeRange", &[]).expect("DateTimeRange");
    let isorted = u.declare_interface("ISorted", &["T"]).expect("ISorted");
    let schedule = u.declare_class("Schedule", &[]).expect("Schedule");
    let animal = u.declare_class("Animal", &[]).expect("Animal");
    let dog = u.declare_class("Dog", &[]).expect("Dog");
    let cat = u.declare_class("Cat", &[]).expect("Cat");
    let exception = u.declare_class("Exception", &[]).expect("Exception");

    let f = Fixture {
        u,
        object,
        value_type,
        ienumerable,
        icollection,
        list,
        key_value_pair,
        dictionary,
        icomparable,
        iequatable,
        int32,
        datetime,
        ientity,
        igeneric_entity,
        entity,
        specific_entity,
        irange,
        range,
        datetime_range,
        isorted,
        schedule,
        animal,
        dog,
        cat,
        exception,
    };
    let u = &f.u;

    // Collections
    let t = f.param(icollection, 0);
    u.add_interface(icollection, f.app(ienumerable, &[t])).expect("ICollection<T>");
    let t = f.param(list, 0);
    u.set_base(list, object).expect("List base");
    u.add_interface(list, f.app(icollection, &[t])).expect("List : ICollection<T>");
    u.add_interface(list, f.app(ienumerable, &[t])).expect("List : IEnumerable<T>");
    u.set_base(key_value_pair, value_type).expect("KeyValuePair base");
    let (k, v) = (f.param(dictionary, 0), f.param(dictionary, 1));
    u.set_base(dictionary, object).expect("Dictionary base");
    let pair = f.app(key_value_pair, &[k, v]);
    u.add_interface(dictionary, f.app(icollection, &[pair]))
        .expect("Dictionary : ICollection<KeyValuePair<K, V>>");

    // Comparable value types
    for value in [int32, datetime] {
        u.set_base(value, value_type).expect("value base");
        u.add_interface(value, f.app(icomparable, &[value])).expect("IComparable<Self>");
        u.add_interface(value, f.app(iequatable, &[value])).expect("IEquatable<Self>");
    }

    // Entities
    u.add_constraint(f.param(igeneric_entity, 0), ientity)
        .expect("IGenericEntityType<T : IEntityType>");
    u.add_interface(igeneric_entity, ientity).expect("IGenericEntityType : IEntityType");
    u.set_base(entity, object).expect("EntityType base");
    u.add_interface(entity, ientity).expect("EntityType : IEntityType");
    u.set_base(specific_entity, object).expect("SpecificEntityType base");
    u.add_interface(specific_entity, f.app(igeneric_entity, &[entity]))
        .expect("SpecificEntityType : IGenericEntityType<EntityType>");

    // Ranges
    let t = f.param(range, 0);
    u.add_constraint(t, f.app(icomparable, &[t])).expect("T : IComparable<T>");
    u.add_constraint(t, f.app(iequatable, &[t])).expect("T : IEquatable<T>");
    u.set_base(range, object).expect("Range base");
    u.add_interface(range, irange).expect("Range : IRange");
    let range_t = f.app(range, &[t]);
    assert_eq!(range_t, range, "Range<T> is the open definition");
    u.add_interface(range, f.app(icomparable, &[range_t])).expect("IComparable<Range<T>>");
    u.add_interface(range, f.app(iequatable, &[range_t])).expect("IEquatable<Range<T>>");
    u.set_base(datetime_range, f.app(range, &[datetime])).expect("DateTimeRange base");
    u.add_interface(datetime_range, f.app(icomparable, &[datetime_range]))
        .expect("IComparable<DateTimeRange>");
    u.add_interface(datetime_range, f.app(iequatable, &[datetime_range]))
        .expect("IEquatable<DateTimeRange>");

    // F-bounded interface
    let t = f.param(isorted, 0);
    u.add_constraint(t, f.app(icomparable, &[t])).expect("T : IComparable<T>");
    u.set_base(schedule, object).expect("Schedule base");
    u.add_interface(schedule, f.app(isorted, &[datetime])).expect("Schedule : ISorted<DateTime>");

    // Animals
    for ty in [animal, exception] {
        u.set_base(ty, object).expect("base");
    }
    u.set_base(dog, animal).expect("Dog base");
    u.set_base(cat, animal).expect("Cat base");

    f
}
