//! Document Store Property Tests
//!
//! Invariants that must hold for any command sequence:
//! - scale factors never drop below the floor
//! - font sizes stay within bounds and font families stay supported
//! - a selection set by the store always points at a live object
//! - a new photo always resets objects and selection

use overlay_core::object::{MAX_FONT_SIZE, MIN_FONT_SIZE, MIN_SCALE, SUPPORTED_FONTS};
use overlay_core::{BaseImage, DocumentStore, ObjectPatch, StoreChange, StoreCommand};
use proptest::prelude::*;

fn arb_patch() -> impl Strategy<Value = ObjectPatch> {
    (
        proptest::option::of(prop_oneof![Just(f32::NAN), Just(f32::NEG_INFINITY), -5.0f32..5.0]),
        proptest::option::of(-5.0f32..5.0),
        proptest::option::of(prop_oneof![Just(f64::NAN), -500.0f64..500.0]),
        proptest::option::of(prop_oneof![
            Just("Lato".to_string()),
            Just("Wingdings".to_string()),
            "[A-Za-z ]{0,12}",
        ]),
    )
        .prop_map(|(scale_x, scale_y, font_size, font_family)| ObjectPatch {
            scale_x,
            scale_y,
            font_size,
            font_family,
            ..ObjectPatch::default()
        })
}

#[derive(Debug, Clone)]
enum Step {
    Add,
    Patch(usize, ObjectPatch),
    Delete(usize),
    Photo(u32, u32),
    Clear,
}

fn arb_step() -> impl Strategy<Value = Step> {
    prop_oneof![
        3 => Just(Step::Add),
        5 => (any::<usize>(), arb_patch()).prop_map(|(i, p)| Step::Patch(i, p)),
        2 => any::<usize>().prop_map(Step::Delete),
        1 => (1u32..4000, 1u32..4000).prop_map(|(w, h)| Step::Photo(w, h)),
        1 => Just(Step::Clear),
    ]
}

proptest! {
    #[test]
    fn prop_values_stay_in_bounds(steps in prop::collection::vec(arb_step(), 0..50)) {
        let mut store = DocumentStore::new();

        for step in steps {
            let pick = |i: usize| {
                let objects = store.objects();
                (!objects.is_empty()).then(|| objects[i % objects.len()].id)
            };
            let command = match step {
                Step::Add => Some(StoreCommand::AddTextObject),
                Step::Patch(i, patch) => pick(i).map(|id| StoreCommand::UpdateObject { id, patch }),
                Step::Delete(i) => pick(i).map(|id| StoreCommand::DeleteObject { id }),
                Step::Photo(w, h) => Some(StoreCommand::SetBaseImage {
                    image: BaseImage::new("photo.jpg", w, h),
                }),
                Step::Clear => Some(StoreCommand::ClearCanvas),
            };
            let Some(command) = command else { continue };
            let change = store.apply(command);

            if let StoreChange::BaseImageSet { width, height } = change {
                prop_assert!(store.objects().is_empty());
                prop_assert!(store.active_object_id().is_none());
                prop_assert!(width <= 430 && height <= 700);
            }

            for object in store.objects() {
                prop_assert!(object.scale_x >= MIN_SCALE, "scale_x {}", object.scale_x);
                prop_assert!(object.scale_y >= MIN_SCALE, "scale_y {}", object.scale_y);
                let text = object.as_text().expect("only text objects are added");
                prop_assert!((MIN_FONT_SIZE..=MAX_FONT_SIZE).contains(&text.font_size));
                prop_assert!(SUPPORTED_FONTS.contains(&text.font_family.as_str()));
            }

            if let Some(active) = store.active_object_id() {
                prop_assert!(store.object(active).is_some());
            }
        }
    }

    #[test]
    fn prop_delete_clears_only_active(count in 1usize..8, victim in any::<usize>()) {
        let mut store = DocumentStore::new();
        let ids: Vec<_> = (0..count).map(|_| store.add_text_object()).collect();
        let active = store.active_object_id();
        let target = ids[victim % ids.len()];

        let change = store.delete_object(target);
        let was_active = active == Some(target);
        prop_assert_eq!(change, StoreChange::ObjectDeleted { id: target, was_active });
        if was_active {
            prop_assert!(store.active_object_id().is_none());
        } else {
            prop_assert_eq!(store.active_object_id(), active);
        }
    }
}

#[test]
fn test_new_text_anchor_follows_canvas() {
    let mut store = DocumentStore::new();
    let id = store.add_text_object();
    let obj = store.object(id).expect("object");
    assert!((obj.x - 400.0).abs() < f32::EPSILON);
    assert!((obj.y - 210.0).abs() < 1e-3);
}
