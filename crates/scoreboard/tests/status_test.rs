//! Tests for score status parsing.

use scoreboard::ScoreStatus;

#[test]
fn test_status_parses_exact_tags() {
    assert_eq!("Win".parse::<ScoreStatus>(), Ok(ScoreStatus::Win));
    assert_eq!("Lose".parse::<ScoreStatus>(), Ok(ScoreStatus::Lose));
    assert!("Draw".parse::<ScoreStatus>().is_err());
    assert!("LOSE".parse::<ScoreStatus>().is_err());
}

#[test]
fn test_status_delta() {
    assert_eq!(ScoreStatus::Win.delta(), 1);
    assert_eq!(ScoreStatus::Lose.delta(), -1);
    assert_eq!(ScoreStatus::Win.to_string(), "Win");
}
