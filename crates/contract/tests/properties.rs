//! Property tests for record encoding and create/read round trips.

use enginelife_contract::canonical::to_canonical_vec;
use enginelife_contract::{EngineAttributes, EngineLifecycle, EngineRecord};
use enginelife_state::MemoryWorldState;
use proptest::prelude::*;
use serde_json::{Map, Value};

fn attributes() -> impl Strategy<Value = EngineAttributes> {
    (
        "\\PC{0,16}",
        "\\PC{0,16}",
        any::<u32>(),
        "\\PC{0,16}",
        "\\PC{0,16}",
    )
        .prop_map(|(make, model, age, condition, owner)| {
            EngineAttributes::new(make, model, age, condition, owner)
        })
}

fn record() -> impl Strategy<Value = EngineRecord> {
    (
        "[a-zA-Z0-9_-]{1,12}",
        attributes(),
        prop::collection::vec("\\PC{0,24}", 0..4),
    )
        .prop_map(|(id, attrs, services)| {
            let mut rec = EngineRecord::new(id, attrs);
            rec.services = services;
            rec
        })
}

proptest! {
    #[test]
    fn create_then_read_round_trips(id in "[a-zA-Z0-9_-]{1,12}", attrs in attributes()) {
        let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
        let rec = rt.block_on(async {
            let state = MemoryWorldState::new();
            let c = EngineLifecycle::new(&state);
            c.create(&id, attrs.clone()).await.unwrap();
            serde_json::from_slice::<EngineRecord>(&c.read(&id).await.unwrap()).unwrap()
        });
        prop_assert_eq!(rec, EngineRecord::new(id, attrs));
    }

    /// The same record encodes to the same bytes whichever order its
    /// fields were inserted in.
    #[test]
    fn encoding_ignores_field_insertion_order(rec in record(), rotate in 0usize..8) {
        let direct = to_canonical_vec(&rec).unwrap();

        let value = serde_json::to_value(&rec).unwrap();
        let Value::Object(map) = value else { panic!("record encodes as an object") };
        let mut fields: Vec<(String, Value)> = map.into_iter().collect();
        fields.reverse();
        let len = fields.len();
        fields.rotate_left(rotate % len);
        let mut reordered = Map::new();
        for (k, v) in fields {
            reordered.insert(k, v);
        }

        prop_assert_eq!(to_canonical_vec(&Value::Object(reordered)).unwrap(), direct.clone());
        prop_assert_eq!(to_canonical_vec(&rec).unwrap(), direct);
    }

    #[test]
    fn encoding_is_compact(rec in record()) {
        let text = String::from_utf8(to_canonical_vec(&rec).unwrap()).unwrap();
        let reparsed: Value = serde_json::from_str(&text).unwrap();
        prop_assert_eq!(serde_json::to_string(&reparsed).unwrap(), text);
    }
}
