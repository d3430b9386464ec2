use crate::schema::{Card, CardDef, Catalog, CatalogFile, GameConfig};
use anyhow::{bail, Context};
use serde::de::DeserializeOwned;
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use tracing::info;

pub const CONFIG_FILE: &str = "config.json";
pub const CATALOG_FILE: &str = "cards.json";

/// Reads `config.json` from `dir`; a missing file means defaults.
pub fn load_game_config(dir: &Path) -> anyhow::Result<GameConfig> {
    let path = dir.join(CONFIG_FILE);
    if !path.exists() {
        info!(path = %path.display(), "no config file, using defaults");
        return Ok(GameConfig::default().validated());
    }
    let config: GameConfig = load_json(&path)?;
    Ok(config.validated())
}

/// Reads `cards.json` from `dir`; a missing file means the standard deck with two jokers.
pub fn load_catalog(dir: &Path) -> anyhow::Result<Catalog> {
    let path = dir.join(CATALOG_FILE);
    if !path.exists() {
        return Ok(Catalog::default());
    }
    let file: CatalogFile = load_json(&path)?;
    catalog_from_file(file).with_context(|| format!("validate {}", path.display()))
}

pub fn catalog_from_file(file: CatalogFile) -> anyhow::Result<Catalog> {
    match file {
        CatalogFile::Standard { jokers } => Ok(Catalog::standard(jokers)),
        CatalogFile::Cards(defs) => catalog_from_defs(&defs),
    }
}

fn catalog_from_defs(defs: &[CardDef]) -> anyhow::Result<Catalog> {
    if defs.is_empty() {
        bail!("catalog has no cards");
    }
    let mut seen = HashSet::new();
    let mut cards = Vec::with_capacity(defs.len());
    for (index, def) in defs.iter().enumerate() {
        let card = Card::new(index as u32, def.suit, def.rank);
        if !card.is_joker && !seen.insert((card.suit, card.rank)) {
            bail!("duplicate card {}", card.name());
        }
        cards.push(card);
    }
    if cards.iter().all(|card| card.is_joker) {
        bail!("catalog needs at least one non-joker card for the hand");
    }
    Ok(Catalog { cards })
}

fn load_json<T: DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let raw = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parse {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{DrawPolicy, Rank, ShuffleMode, Suit};
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn unique_temp_dir() -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("time")
            .as_nanos();
        let dir = std::env::temp_dir().join(format!(
            "flipcard_data_load_test_{}_{}",
            std::process::id(),
            nanos
        ));
        fs::create_dir_all(&dir).expect("mkdir");
        dir
    }

    #[test]
    fn missing_files_fall_back_to_defaults() {
        let dir = unique_temp_dir();
        let config = load_game_config(&dir).expect("config");
        assert_eq!(config.rtp.target_rtp, 70.0);
        assert_eq!(config.round.table_cards_per_hand, 8);
        let catalog = load_catalog(&dir).expect("catalog");
        assert_eq!(catalog.len(), 54);
        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn partial_config_keeps_defaults_and_clamps_target() {
        let dir = unique_temp_dir();
        let body = r#"
{
  "rtp": { "target_rtp": 140 },
  "round": { "shuffle": "biased", "draw": "table_order", "base_bet": 2.5 }
}
"#;
        fs::write(dir.join(CONFIG_FILE), body).expect("write");
        let config = load_game_config(&dir).expect("config");
        assert_eq!(config.rtp.target_rtp, 100.0);
        assert_eq!(config.round.shuffle, ShuffleMode::Biased);
        assert_eq!(config.round.draw, DrawPolicy::TableOrder);
        assert_eq!(config.round.base_bet, 2.5);
        assert_eq!(config.round.max_hand_cards, 5);
        assert_eq!(config.rewards.high, 1.25);
        assert_eq!(config.presentation.cycle_speed_ms, 500);
        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn standard_catalog_request() {
        let catalog = catalog_from_file(CatalogFile::Standard { jokers: 0 }).expect("catalog");
        assert_eq!(catalog.len(), 52);
    }

    #[test]
    fn explicit_cards_get_sequential_ids_and_allow_many_jokers() {
        let body = r#"[
  {"suit":"Hearts","rank":"Ace"},
  {"suit":"Joker","rank":"Joker"},
  {"suit":"Joker","rank":"Joker"}
]"#;
        let file: CatalogFile = serde_json::from_str(body).expect("parse");
        let catalog = catalog_from_file(file).expect("catalog");
        let ids: Vec<u32> = catalog.cards.iter().map(|card| card.id).collect();
        assert_eq!(ids, vec![0, 1, 2]);
        assert_eq!(catalog.cards[0].rank, Rank::Ace);
        assert!(catalog.cards[2].is_joker);
    }

    #[test]
    fn rejects_duplicate_and_joker_only_catalogs() {
        let duplicate = CatalogFile::Cards(vec![
            CardDef {
                suit: Suit::Clubs,
                rank: Rank::Nine,
            },
            CardDef {
                suit: Suit::Clubs,
                rank: Rank::Nine,
            },
        ]);
        let err = catalog_from_file(duplicate).expect_err("duplicate");
        assert!(err.to_string().contains("Nine of Clubs"));

        let jokers = CatalogFile::Cards(vec![CardDef {
            suit: Suit::Joker,
            rank: Rank::Joker,
        }]);
        assert!(catalog_from_file(jokers).is_err());
        assert!(catalog_from_file(CatalogFile::Cards(Vec::new())).is_err());
    }

    #[test]
    fn malformed_json_names_the_file() {
        let dir = unique_temp_dir();
        fs::write(dir.join(CONFIG_FILE), "{ not json").expect("write");
        let err = load_game_config(&dir).expect_err("parse error");
        assert!(format!("{err:#}").contains(CONFIG_FILE));
        let _ = fs::remove_dir_all(dir);
    }
}
