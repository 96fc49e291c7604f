use std::fmt::Write;

use crate::game::stats_manager::ScoreStore;
use crate::model::GameId;

pub fn home_screen(store: &ScoreStore) -> String {
    let mut text = String::from("morimori\nA few minutes a day of brain training.\n");
    let total = store.total_plays();
    if total > 0 {
        let _ = writeln!(text, "Games played so far: {total}");
    }
    text.push_str("Type `games` to pick a game.");
    text
}

pub fn game_select_screen(store: &ScoreStore) -> String {
    let mut text = String::from("Choose a game (play <game> <easy|normal|hard>):\n");
    for id in GameId::all() {
        let entry = id.catalog_entry();
        let _ = write!(
            text,
            "\n  {:<16} {} [{}] {}",
            entry.id.slug(),
            entry.title,
            entry.area,
            entry.description
        );
        let plays = store.plays(id);
        if plays > 0 {
            let _ = write!(text, " ({plays} played)");
        }
    }
    text
}

pub fn not_found_screen(slug: &str) -> String {
    format!("Game not found: {slug}\nType `games` to see what you can play.")
}
