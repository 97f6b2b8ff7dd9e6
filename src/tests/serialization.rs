#[cfg(test)]
mod test {
    use crate::prelude::*;
    use crate::tests::toolkit::*;

    #[test]
    fn store_entries_serdes() {
        let store = load_store("NAV/V3/MIXD00TST_R_20201770000_01D_MN.rnx");
        for eph in store.iter() {
            let content = serde_json::to_string(eph).unwrap();
            let parsed: Ephemeris = serde_json::from_str(&content).unwrap();
            assert_records_close(&parsed.to_record(), &eph.to_record());
            assert_eq!(parsed.validity(), eph.validity());
        }
        let content = serde_json::to_string(&store.header).unwrap();
        let parsed: NavHeader = serde_json::from_str(&content).unwrap();
        assert_eq!(parsed, store.header);
    }
}
