use alloy_primitives::Address;

/// Removes zero-address entries from a raw investor list, keeping order.
pub fn filter_investors(raw: Vec<Address>) -> Vec<Address> {
    raw.into_iter().filter(|address| !address.is_zero()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::address;

    #[test]
    fn test_zero_addresses_are_removed() {
        let alice = address!("70997970C51812dc3A010C7d01b50e0d17dc79C8");
        let bob = address!("3C44CdDdB6a900fa2b585dd299e03d12FA4293BC");
        let filtered = filter_investors(vec![Address::ZERO, alice, Address::ZERO, bob]);
        assert_eq!(filtered, vec![alice, bob]);
    }

    #[test]
    fn test_all_zero_yields_empty_list() {
        let filtered = filter_investors(vec![Address::ZERO, Address::ZERO]);
        assert!(filtered.is_empty());
    }
}
