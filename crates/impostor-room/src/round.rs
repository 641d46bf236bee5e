//! The round engine: current item plus the random draws.
//!
//! Every draw is uniform over the players connected at that instant.
//! Impostor and first-turn are independent draws, so they may land on
//! the same player. The generator is injected so tests can seed it.

use std::sync::Arc;

use rand::Rng;
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;

use crate::Player;

/// Per-room round state.
pub struct RoundEngine {
    characters: Arc<[String]>,
    current_item: Option<String>,
    rng: StdRng,
}

impl RoundEngine {
    pub fn new(characters: Arc<[String]>, rng: StdRng) -> Self {
        Self {
            characters,
            current_item: None,
            rng,
        }
    }

    /// The item revealed by the last round, `None` while waiting.
    pub fn current_item(&self) -> Option<&str> {
        self.current_item.as_deref()
    }

    /// Makes one player admin if nobody is. Returns the index of the newly
    /// elected admin, or `None` if one already existed or `players` is
    /// empty.
    pub fn elect_admin(&mut self, players: &mut [Player]) -> Option<usize> {
        if players.iter().any(Player::is_admin) {
            return None;
        }
        let idx = self.pick(players.len())?;
        players[idx].set_admin(true);
        Some(idx)
    }

    /// Clears every player's role and first-turn flag and forgets the item.
    pub fn reset(&mut self, players: &mut [Player]) {
        for player in players.iter_mut() {
            player.clear_state();
        }
        self.current_item = None;
    }

    /// Draws the item, the impostor, and the first-turn player.
    ///
    /// Expects a freshly [`reset`](Self::reset) player set. Returns the
    /// drawn item, or `None` (with nothing changed) if either the pool or
    /// the player set is empty.
    pub fn assign(&mut self, players: &mut [Player]) -> Option<&str> {
        if players.is_empty() {
            return None;
        }
        let item = self.characters.choose(&mut self.rng)?.clone();
        let impostor = self.pick(players.len())?;
        let first = self.pick(players.len())?;

        players[impostor].set_as_impostor();
        players[first].set_as_first();
        self.current_item = Some(item);
        self.current_item.as_deref()
    }

    fn pick(&mut self, len: usize) -> Option<usize> {
        (len > 0).then(|| self.rng.random_range(0..len))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    use impostor_protocol::PlayerName;
    use rand::SeedableRng;

    fn engine(seed: u64) -> RoundEngine {
        let pool: Arc<[String]> = vec!["Cat".to_string(), "Dog".to_string()].into();
        RoundEngine::new(pool, StdRng::seed_from_u64(seed))
    }

    fn players(names: &[&str]) -> Vec<Player> {
        names
            .iter()
            .map(|n| Player::new(PlayerName::parse(*n).unwrap()))
            .collect()
    }

    #[test]
    fn test_elect_admin_on_empty_set_is_noop() {
        let mut e = engine(1);
        assert_eq!(e.elect_admin(&mut []), None);
    }

    #[test]
    fn test_elect_admin_keeps_existing_admin() {
        let mut e = engine(1);
        let mut ps = players(&["Ana", "Beto"]);
        ps[1].set_admin(true);

        assert_eq!(e.elect_admin(&mut ps), None);
        assert!(!ps[0].is_admin());
        assert!(ps[1].is_admin());
    }

    #[test]
    fn test_elect_admin_picks_exactly_one() {
        for seed in 0..20 {
            let mut e = engine(seed);
            let mut ps = players(&["Ana", "Beto", "Caro"]);
            let idx = e.elect_admin(&mut ps).expect("someone elected");
            assert!(ps[idx].is_admin());
            assert_eq!(ps.iter().filter(|p| p.is_admin()).count(), 1);
        }
    }

    #[test]
    fn test_assign_sets_one_impostor_and_one_first() {
        for seed in 0..20 {
            let mut e = engine(seed);
            let mut ps = players(&["Ana", "Beto", "Caro", "Dani"]);
            e.reset(&mut ps);

            let item = e.assign(&mut ps).map(str::to_owned);

            assert!(matches!(item.as_deref(), Some("Cat") | Some("Dog")));
            assert_eq!(ps.iter().filter(|p| p.is_impostor()).count(), 1);
            assert_eq!(ps.iter().filter(|p| p.is_first()).count(), 1);
        }
    }

    #[test]
    fn test_reset_clears_flags_and_item() {
        let mut e = engine(3);
        let mut ps = players(&["Ana", "Beto"]);
        e.assign(&mut ps);
        assert!(e.current_item().is_some());

        e.reset(&mut ps);

        assert_eq!(e.current_item(), None);
        assert!(ps.iter().all(|p| !p.is_impostor() && !p.is_first()));
    }

    #[test]
    fn test_same_seed_gives_same_draws() {
        let mut a = engine(42);
        let mut b = engine(42);
        let mut pa = players(&["Ana", "Beto", "Caro"]);
        let mut pb = players(&["Ana", "Beto", "Caro"]);

        a.assign(&mut pa);
        b.assign(&mut pb);

        assert_eq!(a.current_item(), b.current_item());
        assert_eq!(pa, pb);
    }

    #[test]
    fn test_impostor_and_first_can_coincide() {
        // With a single player both draws must land on them.
        let mut e = engine(9);
        let mut ps = players(&["Solo"]);
        e.assign(&mut ps);
        assert!(ps[0].is_impostor());
        assert!(ps[0].is_first());
    }

    #[test]
    fn test_every_player_can_be_drawn_for_each_role() {
        let mut admins = HashSet::new();
        let mut impostors = HashSet::new();
        let mut firsts = HashSet::new();

        for seed in 0..200 {
            let mut e = engine(seed);
            let mut ps = players(&["Ana", "Beto", "Caro"]);
            admins.insert(e.elect_admin(&mut ps).expect("someone elected"));
            e.assign(&mut ps);
            impostors.insert(ps.iter().position(Player::is_impostor).unwrap());
            firsts.insert(ps.iter().position(Player::is_first).unwrap());
        }

        let everyone = HashSet::from([0, 1, 2]);
        assert_eq!(admins, everyone);
        assert_eq!(impostors, everyone);
        assert_eq!(firsts, everyone);
    }

    #[test]
    fn test_impostor_and_first_are_drawn_independently() {
        let mut coincide = 0;
        let mut differ = 0;

        for seed in 0..200 {
            let mut e = engine(seed);
            let mut ps = players(&["Ana", "Beto", "Caro"]);
            e.assign(&mut ps);
            let impostor = ps.iter().position(Player::is_impostor).unwrap();
            let first = ps.iter().position(Player::is_first).unwrap();
            if impostor == first {
                coincide += 1;
            } else {
                differ += 1;
            }
        }

        assert!(coincide > 0, "impostor and first never coincided");
        assert!(differ > 0, "impostor and first always coincided");
    }

    #[test]
    fn test_item_varies_across_rounds() {
        let mut e = engine(5);
        let mut ps = players(&["Ana", "Beto"]);
        let mut items = HashSet::new();

        for _ in 0..50 {
            e.reset(&mut ps);
            let item = e.assign(&mut ps).expect("item drawn").to_string();
            items.insert(item);
        }

        assert_eq!(items, HashSet::from(["Cat".to_string(), "Dog".to_string()]));
    }
}
