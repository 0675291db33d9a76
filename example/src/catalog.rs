use masonry_feed::Item;
use serde::Serialize;

/// Demo payload carried through the feed untouched.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Photo {
    pub title: String,
    pub color: &'static str,
}

const SHAPES: [(u32, u32); 6] = [
    (1600, 1200),
    (1200, 1600),
    (1920, 1080),
    (1080, 1350),
    (1000, 1000),
    (2400, 1000),
];

const COLORS: [&str; 5] = ["#264653", "#2a9d8f", "#e9c46a", "#f4a261", "#e76f51"];

/// Deterministic result list for `query`.
pub fn photos(query: &str, total: u64) -> Vec<Item<Photo>> {
    let seed = query
        .bytes()
        .fold(17u64, |acc, byte| acc.wrapping_mul(31).wrapping_add(u64::from(byte)));
    (0..total)
        .map(|n| {
            let mix = seed.wrapping_add(n.wrapping_mul(2_654_435_761));
            let (width, height) = SHAPES[(mix % SHAPES.len() as u64) as usize];
            let color = COLORS[(mix / 7 % COLORS.len() as u64) as usize];
            Item::new(
                n,
                width,
                height,
                Photo {
                    title: format!("{query} #{n}"),
                    color,
                },
            )
        })
        .collect()
}
