//! Message text for one matched item.
//!
//! The rendered string doubles as the change fingerprint: two snapshots that
//! render to the same bytes are the same message as far as the engine is
//! concerned, so every field shown here is rounded to its display precision.

use std::fmt::Write;

use market::ItemSnapshot;

const MISSING: &str = "?";

/// HTML body (Telegram `parse_mode=HTML`) for `item`.
pub fn render(item: &ItemSnapshot) -> String {
    let name = escape_html(&item.display_name);
    let title = match &item.link {
        Some(link) => format!("<a href='{}'>{}</a>", escape_html(link), name),
        None => name,
    };

    let mut out = title;
    let _ = write!(out, "\n   💵 Price: ${}", fixed(item.usd_price, 2));
    let _ = write!(out, "\n   🧾 Floor: {} ETH", fixed(item.native_floor, 4));
    let _ = write!(out, "\n   🤝 Offer: {} ETH", fixed(item.native_offer, 4));
    let _ = write!(out, "\n   📉 Spread: {}%", fixed(item.spread_percent(), 2));
    out
}

fn fixed(value: Option<f64>, decimals: usize) -> String {
    match value {
        Some(v) => format!("{v:.decimals$}"),
        None => MISSING.to_string(),
    }
}

pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn azuki() -> ItemSnapshot {
        ItemSnapshot {
            identity: Some("azuki".into()),
            display_name: "Azuki".into(),
            usd_price: Some(100.0),
            native_floor: Some(1.0),
            native_offer: Some(0.98),
            link: Some("https://opensea.io/collection/azuki".into()),
        }
    }

    #[test]
    fn full_layout() {
        assert_eq!(
            render(&azuki()),
            "<a href='https://opensea.io/collection/azuki'>Azuki</a>\n   \
             💵 Price: $100.00\n   \
             🧾 Floor: 1.0000 ETH\n   \
             🤝 Offer: 0.9800 ETH\n   \
             📉 Spread: 2.00%"
        );
    }

    #[test]
    fn missing_values_render_as_placeholder() {
        let item = ItemSnapshot {
            usd_price: None,
            native_offer: None,
            link: None,
            ..azuki()
        };
        let text = render(&item);

        assert!(text.starts_with("Azuki\n"));
        assert!(text.contains("Price: $?"));
        assert!(text.contains("Offer: ? ETH"));
        assert!(text.contains("Spread: ?%"));
        assert!(text.contains("Floor: 1.0000 ETH"));
    }

    #[test]
    fn sub_precision_changes_render_identically() {
        let moved = ItemSnapshot {
            usd_price: Some(100.004),
            native_floor: Some(1.00001),
            ..azuki()
        };
        assert_eq!(render(&azuki()), render(&moved));

        let visible = ItemSnapshot {
            usd_price: Some(100.01),
            ..azuki()
        };
        assert_ne!(render(&azuki()), render(&visible));
    }

    #[test]
    fn names_are_escaped() {
        let item = ItemSnapshot {
            display_name: "<Bad & 'Co'>".into(),
            link: None,
            ..azuki()
        };
        assert!(render(&item).starts_with("&lt;Bad &amp; &#39;Co&#39;&gt;\n"));
    }
}
