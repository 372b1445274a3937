use std::collections::BTreeMap;

use proptest::prelude::*;
use strata_config::{Config, Map, Value};

fn layers() -> impl Strategy<Value = Vec<BTreeMap<String, i64>>> {
    prop::collection::vec(
        prop::collection::btree_map("[a-f]{1,3}", any::<i64>(), 0..8),
        1..6,
    )
}

fn to_map(layer: &BTreeMap<String, i64>) -> Map {
    layer
        .iter()
        .map(|(key, value)| (key.clone(), Value::from(*value)))
        .collect()
}

proptest! {
    #[test]
    fn prop_last_writer_wins(layers in layers()) {
        let config = Config::new();
        for layer in &layers {
            config.add_map(to_map(layer));
        }

        let mut expected = BTreeMap::new();
        for layer in &layers {
            expected.extend(layer.iter().map(|(k, v)| (k.clone(), *v)));
        }

        for (key, value) in &expected {
            prop_assert_eq!(config.get(key), Some(Value::from(*value)));
        }
        prop_assert_eq!(config.snapshot().len(), expected.len());
    }

    #[test]
    fn prop_lookup_ignores_case(layers in layers()) {
        let config = Config::new();
        for layer in &layers {
            config.add_map(to_map(layer));
        }

        for key in layers.iter().flat_map(|layer| layer.keys()) {
            prop_assert_eq!(config.get(&key.to_uppercase()), config.get(key));
        }
    }

    #[test]
    fn prop_disjoint_layers_commute(layers in layers()) {
        let forward = Config::new();
        let backward = Config::new();
        let mut seen = std::collections::BTreeSet::new();
        let disjoint: Vec<Map> = layers
            .iter()
            .map(|layer| {
                layer
                    .iter()
                    .filter(|(key, _)| seen.insert((*key).clone()))
                    .map(|(key, value)| (key.clone(), Value::from(*value)))
                    .collect()
            })
            .collect();

        for layer in &disjoint {
            forward.add_map(layer.clone());
        }
        for layer in disjoint.iter().rev() {
            backward.add_map(layer.clone());
        }

        prop_assert_eq!(forward.snapshot(), backward.snapshot());
    }

    #[test]
    fn prop_uppercase_layers_store_lowercase(layer in prop::collection::btree_map("[a-f]{1,3}", any::<i64>(), 0..8)) {
        let config = Config::new();
        let shouted: Map = layer
            .iter()
            .map(|(key, value)| (key.to_uppercase(), Value::from(*value)))
            .collect();
        config.add_map(shouted);

        prop_assert!(config.snapshot().keys().all(|key| key == &key.to_lowercase()));
    }
}
