use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize)]
pub struct PaginationParams {
    #[serde(default = "default_limit")]
    pub limit: u64,
    #[serde(default)]
    pub offset: u64,
}

fn default_limit() -> u64 { 20 }

impl PaginationParams {
    pub fn limit(&self) -> u64 {
        self.limit.clamp(1, 100)
    }

    pub fn offset(&self) -> u64 {
        self.offset
    }
}

impl Default for PaginationParams {
    fn default() -> Self {
        Self { limit: 20, offset: 0 }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Paginated<T: Serialize> {
    pub items: Vec<T>,
    pub total: u64,
    pub limit: u64,
    pub offset: u64,
    pub has_more: bool,
}

impl<T: Serialize> Paginated<T> {
    pub fn new(items: Vec<T>, total: u64, params: &PaginationParams) -> Self {
        let limit = params.limit();
        let offset = params.offset();
        Self {
            items,
            total,
            limit,
            offset,
            has_more: offset.saturating_add(limit) < total,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(limit: u64, offset: u64) -> PaginationParams {
        PaginationParams { limit, offset }
    }

    #[test]
    fn has_more_matches_offset_plus_limit_under_total() {
        for (limit, offset, total) in [
            (20u64, 0u64, 50u64),
            (20, 40, 50),
            (20, 30, 50),
            (10, 0, 10),
            (1, 0, 0),
            (100, 0, 100),
            (5, 95, 100),
        ] {
            let p = Paginated::new(Vec::<u32>::new(), total, &page(limit, offset));
            assert_eq!(
                p.has_more,
                offset + p.limit < total,
                "limit={limit} offset={offset} total={total}"
            );
        }
    }

    #[test]
    fn limit_is_clamped_to_100() {
        let p = Paginated::new(Vec::<u32>::new(), 1000, &page(500, 0));
        assert_eq!(p.limit, 100);
        assert!(p.has_more);
    }

    #[test]
    fn zero_limit_becomes_one() {
        assert_eq!(page(0, 0).limit(), 1);
    }

    #[test]
    fn defaults_are_first_twenty() {
        let params = PaginationParams::default();
        assert_eq!(params.limit(), 20);
        assert_eq!(params.offset(), 0);
    }

    #[test]
    fn empty_result_set_has_no_more() {
        let p = Paginated::new(Vec::<u32>::new(), 0, &page(20, 0));
        assert!(!p.has_more);
        assert_eq!(p.total, 0);
    }
}
