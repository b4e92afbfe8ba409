/// Application name
pub const APP_NAME: &str = "Kindred";

/// Textual form of the anonymous principal
pub const ANONYMOUS_PRINCIPAL: &str = "2vxsx-fae";

/// Accepted profile age range (inclusive)
pub const MIN_AGE: u32 = 18;
pub const MAX_AGE: u32 = 120;

/// Photo selection bounds per profile
pub const MIN_PHOTOS: usize = 1;
pub const MAX_PHOTOS: usize = 5;

/// Stock avatar references offered by the photo picker
pub const AVAILABLE_PHOTOS: [&str; 8] = [
    "/assets/generated/avatar-01.dim_512x512.png",
    "/assets/generated/avatar-02.dim_512x512.png",
    "/assets/generated/avatar-03.dim_512x512.png",
    "/assets/generated/avatar-04.dim_512x512.png",
    "/assets/generated/avatar-05.dim_512x512.png",
    "/assets/generated/avatar-06.dim_512x512.png",
    "/assets/generated/avatar-07.dim_512x512.png",
    "/assets/generated/avatar-08.dim_512x512.png",
];

/// Placeholder shown when a profile has no photo
pub const FALLBACK_PHOTO: &str = "/assets/generated/avatar-01.dim_512x512.png";

/// Card number suffix length
pub const LAST4_LEN: usize = 4;

/// Number of expiry years offered, starting at the current year
pub const EXPIRY_YEARS_AHEAD: i32 = 15;

/// Discovery feed page size
pub const DEFAULT_FEED_PAGE_SIZE: u64 = 50;

/// Staleness window for general reads (5 minutes)
pub const DEFAULT_STALE_SECS: u64 = 300;

/// Conversation polling period in milliseconds
pub const MESSAGE_POLL_MILLIS: u64 = 3000;
