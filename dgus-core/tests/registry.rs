//! Property tests for registry lookups

use std::collections::BTreeSet;

use dgus_core::{RegistryError, VpRegistry, VpVariable};
use proptest::prelude::*;

fn table(addresses: &BTreeSet<u16>) -> Vec<VpVariable> {
    addresses.iter().map(|&vp| VpVariable::new(vp, 2)).collect()
}

proptest! {
    #[test]
    fn lookup_is_total(
        addresses in proptest::collection::btree_set(any::<u16>(), 0..64),
        probe in any::<u16>(),
        shuffle_seed in any::<u64>(),
    ) {
        let sorted = table(&addresses);
        let mut shuffled = sorted.clone();
        if !shuffled.is_empty() {
            let len = shuffled.len();
            shuffled.rotate_left((shuffle_seed as usize) % len);
            shuffled.reverse();
        }

        for vars in [&sorted, &shuffled] {
            let registry = VpRegistry::new(vars).unwrap();
            let found = registry.find(probe).map(|var| var.vp);
            prop_assert_eq!(found, addresses.contains(&probe).then_some(probe));

            for &vp in &addresses {
                prop_assert_eq!(registry.find(vp).map(|var| var.vp), Some(vp));
            }
        }
    }

    #[test]
    fn duplicates_always_rejected(
        addresses in proptest::collection::btree_set(any::<u16>(), 1..32),
        pick in any::<prop::sample::Index>(),
    ) {
        let mut vars = table(&addresses);
        let duplicate = vars[pick.index(vars.len())];
        vars.push(duplicate);

        prop_assert_eq!(
            VpRegistry::new(&vars).err(),
            Some(RegistryError::DuplicateAddress(duplicate.vp))
        );
    }
}
