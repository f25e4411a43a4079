//! Card rendering helpers.

use coach_core::protocol::Card;
use ratatui::style::{Color, Style};
use ratatui::text::Span;

/// How much room each card gets.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CardSize {
    /// `A♠`
    Small,
    /// `[ A ♠ ]`
    #[default]
    Large,
}

fn card_style(card: &Card) -> Style {
    if card.is_red() {
        Style::default().fg(Color::Red).bold()
    } else {
        Style::default().fg(Color::White).bold()
    }
}

fn face(card: &Card, size: CardSize) -> String {
    match (size, card.rank_str(), card.suit_str()) {
        (CardSize::Small, _, _) => card.to_string(),
        (CardSize::Large, Some(rank), Some(suit)) => format!("[ {} {} ]", rank, suit),
        (CardSize::Large, _, _) => format!("[ {} ]", card.as_str()),
    }
}

/// Empty slot shown where a card has not been dealt.
pub fn empty_slot(size: CardSize) -> Span<'static> {
    let text = match size {
        CardSize::Small => "··",
        CardSize::Large => "[ ? ]",
    };
    Span::styled(text, Style::default().fg(Color::DarkGray))
}

/// Render `cards` left to right, separated by a space.
///
/// `slots` pads the row with empty slots up to that many cards (the board
/// always shows five).
pub fn card_row(cards: &[Card], size: Option<CardSize>, slots: usize) -> Vec<Span<'static>> {
    let size = size.unwrap_or_default();
    let mut spans = Vec::with_capacity(slots.max(cards.len()) * 2);
    for (i, card) in cards.iter().enumerate() {
        if i > 0 {
            spans.push(Span::raw(" "));
        }
        spans.push(Span::styled(face(card, size), card_style(card)));
    }
    for i in cards.len()..slots {
        if i > 0 {
            spans.push(Span::raw(" "));
        }
        spans.push(empty_slot(size));
    }
    spans
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(spans: &[Span]) -> String {
        spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn board_is_padded_to_five() {
        let flop = [Card::new("Ah"), Card::new("Kd"), Card::new("7c")];
        let row = card_row(&flop, None, 5);
        assert_eq!(text(&row), "[ A ♥ ] [ K ♦ ] [ 7 ♣ ] [ ? ] [ ? ]");
    }

    #[test]
    fn small_cards() {
        let hole = [Card::new("Qs"), Card::new("Th")];
        assert_eq!(text(&card_row(&hole, Some(CardSize::Small), 0)), "Q♠ T♥");
    }

    #[test]
    fn unknown_codes_shown_raw() {
        let row = card_row(&[Card::new("??")], Some(CardSize::Large), 1);
        assert_eq!(text(&row), "[ ?? ]");
    }

    #[test]
    fn red_suits_are_red() {
        let row = card_row(&[Card::new("2d"), Card::new("2s")], None, 0);
        assert_eq!(row[0].style.fg, Some(Color::Red));
        assert_eq!(row[2].style.fg, Some(Color::White));
    }

    #[test]
    fn empty_row() {
        assert!(card_row(&[], None, 0).is_empty());
    }
}
