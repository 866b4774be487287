#![allow(clippy::unwrap_used)]

use rust_decimal_macros::dec;

use super::util::*;

// ── truncate ──────────────────────────────────────────────────

#[test]
fn test_truncate_fits() {
    assert_eq!(truncate("Padaria", 10), "Padaria");
    assert_eq!(truncate("Padaria", 7), "Padaria");
    assert_eq!(truncate("", 5), "");
}

#[test]
fn test_truncate_cuts_with_ellipsis() {
    assert_eq!(truncate("Supermercado Extra", 6), "Super…");
    assert_eq!(truncate("hello", 1), "…");
    assert_eq!(truncate("hello", 0), "");
}

#[test]
fn test_truncate_multibyte() {
    assert_eq!(truncate("Pagamento cartão crédito", 16), "Pagamento cartã…");
    assert_eq!(truncate("日本語テスト", 4), "日本語…");
}

// ── format_amount ─────────────────────────────────────────────

#[test]
fn test_format_amount_grouping() {
    assert_eq!(format_amount(dec!(1234.56)), "1,234.56");
    assert_eq!(format_amount(dec!(999.99)), "999.99");
    assert_eq!(format_amount(dec!(10000000)), "10,000,000.00");
}

#[test]
fn test_format_amount_sign_and_rounding() {
    assert_eq!(format_amount(dec!(-42.5)), "-42.50");
    assert_eq!(format_amount(dec!(0)), "0.00");
    assert_eq!(format_amount(dec!(1.005)), "1.00");
    // Rounds to zero, so no sign
    assert_eq!(format_amount(dec!(-0.001)), "0.00");
}

// ── cycle ─────────────────────────────────────────────────────

#[test]
fn test_cycle_wraps_both_ways() {
    let opts = [1, 2, 3];
    assert_eq!(cycle(&opts, &1, 1), Some(2));
    assert_eq!(cycle(&opts, &3, 1), Some(1));
    assert_eq!(cycle(&opts, &1, -1), Some(3));
    assert_eq!(cycle(&opts, &9, 1), Some(2));
    assert_eq!(cycle::<i32>(&[], &1, 1), None);
}

#[test]
fn test_cycle_optional_values() {
    let opts = [None, Some("Data"), Some("Valor")];
    assert_eq!(cycle(&opts, &None, 1), Some(Some("Data")));
    assert_eq!(cycle(&opts, &Some("Valor"), 1), Some(None));
}

// ── scrolling ─────────────────────────────────────────────────

#[test]
fn test_scroll_keeps_cursor_visible() {
    let (mut idx, mut scroll) = (0, 0);
    for _ in 0..5 {
        scroll_down(&mut idx, &mut scroll, 10, 3);
    }
    assert_eq!((idx, scroll), (5, 3));
    scroll_up(&mut idx, &mut scroll);
    scroll_up(&mut idx, &mut scroll);
    scroll_up(&mut idx, &mut scroll);
    assert_eq!((idx, scroll), (2, 2));
    scroll_to_bottom(&mut idx, &mut scroll, 10, 3);
    assert_eq!((idx, scroll), (9, 7));
    scroll_to_top(&mut idx, &mut scroll);
    assert_eq!((idx, scroll), (0, 0));
}

#[test]
fn test_scroll_down_stops_at_end() {
    let (mut idx, mut scroll) = (1, 0);
    scroll_down(&mut idx, &mut scroll, 2, 5);
    assert_eq!(idx, 1);
}
