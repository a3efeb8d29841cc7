//! Whole rounds driven through the public session API.

use samegametui::{
    Board, Cell, Cue, Difficulty, Phase, Preset, Session, SessionConfig, Track,
};

fn grid(rows: &[&str]) -> Vec<Vec<Cell>> {
    rows.iter()
        .map(|r| {
            r.chars()
                .map(|c| match c.to_digit(10) {
                    Some(d) => Cell::Tile(d as u8),
                    None => Cell::Empty,
                })
                .collect()
        })
        .collect()
}

fn session(ticks_per_second: u32) -> Session {
    Session::new(
        SessionConfig {
            ticks_per_second,
            seed: Some(2024),
        },
        Difficulty::Easy,
    )
    .unwrap()
}

fn start(s: &mut Session, rows: &[&str], num_colors: u8, time_limit: Option<u32>) {
    let board = Board::from_grid(num_colors, grid(rows)).unwrap();
    let preset = Preset {
        name: "Custom",
        description: "",
        rows: board.rows(),
        cols: board.cols(),
        num_colors,
        time_limit,
        score_multiplier: 1.0,
    };
    s.start_with_board(preset, board).unwrap();
}

#[test]
fn clearing_the_board_ranks_the_score() {
    let mut s = session(30);
    start(&mut s, &["01", "01", "00"], 2, None);
    s.take_cues();

    let first = s.click(1, 0).unwrap();
    assert_eq!((first.color, first.cells.len(), first.points), (1, 2, 8));
    assert_eq!(s.tick(), None);

    let second = s.click(0, 0).unwrap();
    assert_eq!(second.cells.len(), 4);
    assert_eq!(s.score(), 72);
    assert_eq!(s.tick(), Some(Phase::BoardCleared));

    let cues = s.take_cues();
    assert!(cues.contains(&Cue::TilesCleared {
        color: 1,
        cells: 2,
        points: 8
    }));
    assert!(cues.contains(&Cue::Music(Track::Victory)));

    s.advance();
    assert_eq!(s.phase(), Phase::ScoreDisplay);
    assert_eq!(s.last_rank(), Some(7));
    assert_eq!(s.ledger().scores()[7], 72);
    assert_eq!(s.ledger().scores().len(), 10);
}

#[test]
fn timed_round_runs_out() {
    let mut s = session(2);
    start(&mut s, &["00", "01"], 2, Some(1));
    assert_eq!(s.remaining_secs(), Some(1));
    s.take_cues();

    assert_eq!(s.tick(), None);
    assert_eq!(s.current_track(), Some(Track::Critical));
    assert_eq!(s.tick(), Some(Phase::TimeExpired));
    assert_eq!(s.remaining_secs(), Some(0));
    assert_eq!(
        s.take_cues(),
        vec![
            Cue::Music(Track::Critical),
            Cue::PhaseEntered(Phase::TimeExpired),
            Cue::Music(Track::GameOver),
        ]
    );

    assert!(s.click(0, 0).is_none());
    assert_eq!(s.tick(), None);
}

#[test]
fn stuck_board_ends_on_next_tick() {
    let mut s = session(30);
    start(&mut s, &["01", "10"], 2, None);
    assert_eq!(s.tick(), Some(Phase::NoMovesAvailable));
    s.advance();
    s.advance();
    assert_eq!(s.phase(), Phase::Leaderboard);
    // Zero does not displace the seeded list.
    assert_eq!(s.last_rank(), None);
}

#[test]
fn retry_restores_layout_and_score() {
    let mut s = session(30);
    start(&mut s, &["001", "122"], 3, None);
    s.click(0, 0).unwrap();
    assert_ne!(s.score(), 0);

    s.retry();
    assert_eq!(s.score(), 0);
    assert_eq!(s.board().get(0, 0), Some(Cell::Tile(0)));
    assert_eq!(s.board().get(2, 1), Some(Cell::Tile(2)));
    assert_eq!(s.board().remaining(), 6);
}

#[test]
fn same_seed_deals_same_boards() {
    let deal = || {
        let mut s = session(30);
        s.advance();
        s.select(Difficulty::Expert);
        s.board().iter_rows().map(<[Cell]>::to_vec).collect::<Vec<_>>()
    };
    let a = deal();
    assert_eq!(a, deal());
    assert_eq!((a.len(), a[0].len()), (10, 20));
}

#[test]
fn mismatched_board_is_rejected() {
    let mut s = session(30);
    let board = Board::from_grid(2, grid(&["01", "10"])).unwrap();
    assert!(s.start_with_board(Difficulty::Easy.preset(), board).is_err());
    assert_eq!(s.phase(), Phase::Intro);
}
