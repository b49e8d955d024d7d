use serde::Deserialize;

/// Depth snapshot exactly as the venue returns it from `/api/v3/depth`.
#[derive(Debug, Clone, Deserialize)]
pub struct RawDepth {
    #[serde(rename = "lastUpdateId")]
    pub last_update_id: u64,
    pub bids: Vec<[String; 2]>,
    pub asks: Vec<[String; 2]>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Bids,
    Asks,
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Bids => f.write_str("bids"),
            Side::Asks => f.write_str("asks"),
        }
    }
}
