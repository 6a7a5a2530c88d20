use crate::gacha::*;

/// Populate the gacha catalogue: three themed pull animations per tier and
/// the two prize pools.
pub fn populate_catalog(catalog: &mut GachaCatalog) {
    catalog.presentations = vec![
        presentation("genshin", Tier::Common, 8.0, 1.0),
        presentation("wuwa", Tier::Common, 9.0, 0.9),
        presentation("hsr", Tier::Common, 14.0, 2.3),
        presentation("genshin", Tier::Rare, 10.0, 1.0),
        presentation("wuwa", Tier::Rare, 12.0, 1.5),
        presentation("hsr", Tier::Rare, 20.0, 3.3),
    ];

    catalog.rewards = RewardPools {
        common: [
            "dr_pepper",
            "dumplings",
            "jinhsi",
            "kansai_ben",
            "nekota_tsuna",
            "overwatch",
            "reaver_vandal",
            "rushia",
            "vrc",
            "wuwa",
        ]
        .into_iter()
        .map(|id| prize(Tier::Common, id))
        .collect(),
        rare: ["camellya", "japanese_souffle_pancakes", "risu", "valorant"]
            .into_iter()
            .map(|id| prize(Tier::Rare, id))
            .collect(),
    };
}

fn presentation(theme: &str, tier: Tier, base_secs: f32, playback_rate: f32) -> Presentation {
    let name = format!("{}star_{}", tier.stars(), theme);
    Presentation {
        video: format!("gacha/{name}.mp4"),
        name,
        tier,
        base_secs,
        playback_rate,
    }
}

fn prize(tier: Tier, id: &str) -> Reward {
    Reward::new(id, &format!("gacha/prizes/{}_star_{}.png", tier.stars(), id))
}
