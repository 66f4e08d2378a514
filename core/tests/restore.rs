//! Reactivation: putting a resolved snapshot back onto its unit under the
//! per-role eligibility policy.

use mothball_core::{
    config::{Ineligible, RestorePolicy, RolePolicy},
    error::MothballError,
    force::Force,
    person::{Person, PersonStatus},
    reference::Reference,
    registry::CrewedUnit,
    restore::{restore, SkippedReattachment},
    snapshot::{CrewRole, MothballSnapshot},
    types::{ForceId, PersonHandle},
    unit::{Engineer, Unit},
};
use std::{collections::HashMap, rc::Rc};
use uuid::Uuid;

fn id(n: u128) -> Uuid {
    Uuid::from_u128(n)
}

fn person(n: u128) -> PersonHandle {
    Person::new(id(n), format!("p{n}")).into_handle()
}

fn no_forces() -> HashMap<ForceId, Force> {
    HashMap::new()
}

/// Capture the unit and strip it, the way mothballing does.
fn mothball(unit: &mut Unit) -> MothballSnapshot {
    let snapshot = MothballSnapshot::capture(unit);
    unit.strip_assignments();
    snapshot
}

fn contains(list: &[PersonHandle], p: &PersonHandle) -> bool {
    list.iter().any(|x| Rc::ptr_eq(x, p))
}

#[test]
fn gunner_reassigned_elsewhere_stays_there() {
    let _ = env_logger::builder().is_test(true).try_init();
    let gunner = person(1);
    let mut a = Unit::new(id(100), "Atlas");
    let mut b = Unit::new(id(200), "Banshee");
    a.attach_gunner(Rc::clone(&gunner));
    let snapshot = mothball(&mut a);
    assert_eq!(gunner.borrow().unit, None);

    b.attach_gunner(Rc::clone(&gunner));
    let report = restore(snapshot, &mut a, &no_forces(), &RestorePolicy::default()).unwrap();

    assert!(a.gunners.is_empty());
    assert!(contains(&b.gunners, &gunner));
    assert_eq!(gunner.borrow().unit, Some(b.id));
    assert_eq!(
        report.skipped,
        vec![SkippedReattachment {
            role:      CrewRole::Gunner,
            person_id: id(1),
            why:       Ineligible::AssignedElsewhere { unit_id: b.id },
        }]
    );
}

#[test]
fn pilot_listed_as_driver_and_gunner_comes_back_in_both() {
    let pilot = person(1);
    let mut a = Unit::new(id(100), "Locust");
    a.attach_driver(Rc::clone(&pilot));
    a.attach_gunner(Rc::clone(&pilot));
    let snapshot = mothball(&mut a);

    let report = restore(snapshot, &mut a, &no_forces(), &RestorePolicy::default()).unwrap();

    assert!(contains(&a.drivers, &pilot));
    assert!(contains(&a.gunners, &pilot));
    assert_eq!(pilot.borrow().unit, Some(a.id));
    assert!(report.skipped.is_empty());
    assert_eq!(report.attached, vec![(CrewRole::Driver, id(1)), (CrewRole::Gunner, id(1))]);
}

#[test]
fn inactive_driver_is_left_out() {
    let fit = person(1);
    let wounded = person(2);
    let mut a = Unit::new(id(100), "Hunchback");
    a.attach_driver(Rc::clone(&fit));
    a.attach_driver(Rc::clone(&wounded));
    let snapshot = mothball(&mut a);
    wounded.borrow_mut().status = PersonStatus::Kia;

    let report = restore(snapshot, &mut a, &no_forces(), &RestorePolicy::default()).unwrap();

    assert_eq!(a.drivers.len(), 1);
    assert!(contains(&a.drivers, &fit));
    assert_eq!(wounded.borrow().unit, None);
    assert_eq!(
        report.skipped[0].why,
        Ineligible::Inactive { status: PersonStatus::Kia }
    );
}

#[test]
fn drivers_come_back_in_capture_order() {
    let crew: Vec<_> = (1..=4).map(person).collect();
    let mut a = Unit::new(id(100), "Demolisher");
    for p in &crew {
        a.attach_driver(Rc::clone(p));
    }
    let snapshot = mothball(&mut a);

    restore(snapshot, &mut a, &no_forces(), &RestorePolicy::default()).unwrap();

    let ids: Vec<_> = a.drivers.iter().map(|p| p.borrow().id).collect();
    assert_eq!(ids, vec![id(1), id(2), id(3), id(4)]);
}

#[test]
fn technician_is_restored_even_when_busy_elsewhere() {
    let tech = person(9);
    let mut a = Unit::new(id(100), "Warhammer");
    let mut b = Unit::new(id(200), "Marauder");
    a.attach_technician(Rc::clone(&tech));
    let snapshot = mothball(&mut a);
    b.attach_technician(Rc::clone(&tech));

    let report = restore(snapshot, &mut a, &no_forces(), &RestorePolicy::default()).unwrap();

    assert!(a.tech.as_ref().is_some_and(|t| Rc::ptr_eq(t, &tech)));
    assert_eq!(tech.borrow().unit, Some(a.id));
    // The other unit keeps its handle; only the back-reference moved.
    assert!(b.tech.as_ref().is_some_and(|t| Rc::ptr_eq(t, &tech)));
    assert_eq!(report.attached, vec![(CrewRole::Technician, id(9))]);
}

#[test]
fn technician_policy_can_be_tightened() {
    let tech = person(9);
    let mut a = Unit::new(id(100), "Warhammer");
    let mut b = Unit::new(id(200), "Marauder");
    a.attach_technician(Rc::clone(&tech));
    let snapshot = mothball(&mut a);
    b.attach_technician(Rc::clone(&tech));

    let policy = RestorePolicy {
        technician: RolePolicy::ACTIVE_UNASSIGNED,
        ..RestorePolicy::default()
    };
    let report = restore(snapshot, &mut a, &no_forces(), &policy).unwrap();

    assert!(a.tech.is_none());
    assert_eq!(tech.borrow().unit, Some(b.id));
    assert_eq!(report.skipped.len(), 1);
}

#[test]
fn relaxed_policy_reattaches_inactive_crew() {
    let navigator = person(5);
    let mut a = Unit::new(id(100), "Leopard");
    a.attach_navigator(Rc::clone(&navigator));
    let snapshot = mothball(&mut a);
    navigator.borrow_mut().status = PersonStatus::OnLeave;

    let policy = RestorePolicy {
        navigator: RolePolicy::UNCONDITIONAL,
        ..RestorePolicy::default()
    };
    restore(snapshot, &mut a, &no_forces(), &policy).unwrap();

    assert!(a.navigator.as_ref().is_some_and(|p| Rc::ptr_eq(p, &navigator)));
}

#[test]
fn empty_snapshot_restores_nothing() {
    let mut a = Unit::new(id(100), "Spare");
    let report = restore(MothballSnapshot::default(), &mut a, &no_forces(), &RestorePolicy::default())
        .unwrap();

    assert!(report.attached.is_empty());
    assert!(report.skipped.is_empty());
    assert_eq!(report.force_id, None);
    assert!(!a.has_crew());
    assert!(a.tech.is_none());
    assert!(a.engineer().is_none());
}

#[test]
fn unresolved_snapshot_is_refused() {
    let mut a = Unit::new(id(100), "Griffin");
    let snapshot = MothballSnapshot {
        drivers: vec![Reference::Unresolved(id(1))],
        ..Default::default()
    };

    let err = restore(snapshot, &mut a, &no_forces(), &RestorePolicy::default()).unwrap_err();

    assert!(matches!(err, MothballError::UnresolvedSnapshot { unit_id } if unit_id == a.id));
    assert!(a.drivers.is_empty());
}

#[test]
fn surviving_force_is_rejoined() {
    let mut forces = HashMap::new();
    forces.insert(5, Force::new(5, "Fire Lance"));
    let mut a = Unit::new(id(100), "Rifleman");
    a.attach_to_force(&forces[&5]);
    let snapshot = mothball(&mut a);
    assert_eq!(a.force_id, None);

    let report = restore(snapshot, &mut a, &forces, &RestorePolicy::default()).unwrap();

    assert_eq!(a.force_id, Some(5));
    assert_eq!(report.force_id, Some(5));
    assert_eq!(report.missing_force, None);
}

#[test]
fn vanished_force_leaves_unit_unassigned() {
    let _ = env_logger::builder().is_test(true).try_init();
    let driver = person(1);
    let mut a = Unit::new(id(100), "Rifleman");
    a.attach_driver(Rc::clone(&driver));
    a.attach_to_force(&Force::new(5, "Fire Lance"));
    let snapshot = mothball(&mut a);

    let report = restore(snapshot, &mut a, &no_forces(), &RestorePolicy::default()).unwrap();

    assert_eq!(a.force_id, None);
    assert_eq!(report.missing_force, Some(5));
    assert!(contains(&a.drivers, &driver), "crew restore does not depend on the force");
}

#[test]
fn engineer_is_recomputed_from_restored_crew() {
    let crew = [person(1), person(2)];
    let officer = person(3);
    let mut a = Unit::new(id(100), "Union").self_crewed();
    for p in &crew {
        a.attach_vessel_crew(Rc::clone(p));
    }
    a.attach_tech_officer(Rc::clone(&officer));
    a.reset_engineer();
    let snapshot = mothball(&mut a);
    assert!(a.engineer().is_none());

    restore(snapshot, &mut a, &no_forces(), &RestorePolicy::default()).unwrap();

    assert_eq!(
        a.engineer(),
        Some(&Engineer::VesselCrew { lead: id(3), crew_size: 2 })
    );
}

#[test]
fn engineer_falls_back_to_technician() {
    let tech = person(9);
    let mut a = Unit::new(id(100), "Centurion");
    a.attach_technician(Rc::clone(&tech));
    let snapshot = mothball(&mut a);

    restore(snapshot, &mut a, &no_forces(), &RestorePolicy::default()).unwrap();

    assert_eq!(a.engineer(), Some(&Engineer::Tech { person_id: id(9) }));
}
