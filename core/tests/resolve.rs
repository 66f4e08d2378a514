//! Load-time fix-up: decoded placeholders become live people in one pass.

use mothball_core::{
    codec::{decode, encode},
    person::Person,
    reference::Reference,
    registry::CrewedUnit,
    resolver::{resolve, MissingReference},
    snapshot::{CrewRole, MothballSnapshot},
    types::{PersonHandle, PersonId},
    unit::Unit,
};
use std::{collections::HashMap, rc::Rc};
use uuid::Uuid;

fn id(n: u128) -> Uuid {
    Uuid::from_u128(n)
}

fn hire(registry: &mut HashMap<PersonId, PersonHandle>, n: u128) -> PersonHandle {
    let person = Person::new(id(n), format!("crew-{n}")).into_handle();
    registry.insert(id(n), Rc::clone(&person));
    person
}

/// Copies of every person in `registry` except `skip`, as a fresh load
/// would produce them.
fn reload(
    registry: &HashMap<PersonId, PersonHandle>,
    skip: &[u128],
) -> HashMap<PersonId, PersonHandle> {
    registry
        .iter()
        .filter(|(pid, _)| !skip.iter().any(|n| id(*n) == **pid))
        .map(|(pid, p)| (*pid, p.borrow().clone().into_handle()))
        .collect()
}

fn fully_crewed(registry: &mut HashMap<PersonId, PersonHandle>) -> Unit {
    let mut unit = Unit::new(id(1000), "Union");
    for n in 1..=3 {
        unit.attach_driver(hire(registry, n));
    }
    for n in 4..=5 {
        unit.attach_gunner(hire(registry, n));
    }
    unit.attach_vessel_crew(hire(registry, 6));
    unit.attach_tech_officer(hire(registry, 7));
    unit.attach_navigator(hire(registry, 8));
    unit
}

fn resolved_to(slot: &Option<Reference<PersonHandle>>, expected: &PersonHandle) -> bool {
    slot.as_ref()
        .and_then(|r| r.resolved())
        .is_some_and(|p| Rc::ptr_eq(p, expected))
}

#[test]
fn round_trip_loses_only_the_person_who_is_gone() {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut registry = HashMap::new();
    let unit = fully_crewed(&mut registry);
    let entries = encode(&MothballSnapshot::capture(&unit));

    let loaded = reload(&registry, &[2]);
    let mut snapshot = decode(&entries).snapshot;
    assert_eq!(snapshot.unresolved_count(), 8);

    let missing = resolve(&mut snapshot, &loaded);

    assert_eq!(
        missing,
        vec![MissingReference { role: CrewRole::Driver, person_id: id(2) }]
    );
    assert!(snapshot.is_fully_resolved());

    let drivers: Vec<_> = snapshot.drivers.iter().map(|r| r.person_id()).collect();
    assert_eq!(drivers, vec![id(1), id(3)], "survivors keep their order");
    assert_eq!(snapshot.gunners.len(), 2);
    assert_eq!(snapshot.vessel_crew.len(), 1);
    assert!(resolved_to(&snapshot.tech_officer, &loaded[&id(7)]));
    assert!(resolved_to(&snapshot.navigator, &loaded[&id(8)]));

    for (_, r) in snapshot.references() {
        let live = &loaded[&r.person_id()];
        assert!(Rc::ptr_eq(r.resolved().unwrap(), live), "must point at the loaded object");
    }
}

#[test]
fn missing_single_slot_becomes_empty() {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut registry = HashMap::new();
    let mut unit = Unit::new(id(1000), "Scorpion");
    unit.attach_technician(hire(&mut registry, 9));
    unit.attach_navigator(hire(&mut registry, 8));

    let mut snapshot = decode(&encode(&MothballSnapshot::capture(&unit))).snapshot;
    let loaded = reload(&registry, &[9]);
    let missing = resolve(&mut snapshot, &loaded);

    assert!(snapshot.tech.is_none());
    assert!(resolved_to(&snapshot.navigator, &loaded[&id(8)]));
    assert_eq!(
        missing,
        vec![MissingReference { role: CrewRole::Technician, person_id: id(9) }]
    );
}

#[test]
fn tech_officer_slot_is_resolved_too() {
    let mut registry = HashMap::new();
    let mut unit = Unit::new(id(1000), "Mule");
    unit.attach_tech_officer(hire(&mut registry, 7));

    let mut snapshot = decode(&encode(&MothballSnapshot::capture(&unit))).snapshot;
    let missing = resolve(&mut snapshot, &registry);

    assert!(missing.is_empty());
    assert!(resolved_to(&snapshot.tech_officer, &registry[&id(7)]));
}

#[test]
fn resolving_twice_changes_nothing() {
    let mut registry = HashMap::new();
    let unit = fully_crewed(&mut registry);

    let mut snapshot = decode(&encode(&MothballSnapshot::capture(&unit))).snapshot;
    assert!(resolve(&mut snapshot, &registry).is_empty());
    let first: Vec<PersonHandle> = snapshot
        .references()
        .filter_map(|(_, r)| r.resolved().cloned())
        .collect();

    // Second pass against an empty registry: nothing is looked up again.
    let empty: HashMap<PersonId, PersonHandle> = HashMap::new();
    assert!(resolve(&mut snapshot, &empty).is_empty());
    let second: Vec<PersonHandle> = snapshot
        .references()
        .filter_map(|(_, r)| r.resolved().cloned())
        .collect();

    assert_eq!(first.len(), 8);
    assert_eq!(first.len(), second.len());
    assert!(first.iter().zip(&second).all(|(a, b)| Rc::ptr_eq(a, b)));
}

#[test]
fn captured_snapshot_is_already_resolved() {
    let mut registry = HashMap::new();
    let unit = fully_crewed(&mut registry);
    let mut snapshot = MothballSnapshot::capture(&unit);

    assert!(snapshot.is_fully_resolved());
    let empty: HashMap<PersonId, PersonHandle> = HashMap::new();
    assert!(resolve(&mut snapshot, &empty).is_empty());
    assert_eq!(snapshot.drivers.len(), 3);
}

#[test]
fn resolve_leaves_force_and_people_untouched() {
    let mut registry = HashMap::new();
    let person = hire(&mut registry, 1);
    let mut snapshot = MothballSnapshot {
        force_id: Some(3),
        drivers: vec![Reference::Unresolved(id(1))],
        ..Default::default()
    };

    resolve(&mut snapshot, &registry);

    assert_eq!(snapshot.force_id, Some(3));
    assert_eq!(person.borrow().unit, None, "resolution never assigns anyone");
}
