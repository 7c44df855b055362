//! Localized field labels.
//!
//! Covers the fixed label vocabulary of a boarding pass in the languages the
//! service historically shipped. Language detection happens upstream; this
//! module only translates. Unknown languages fall back to English.

/// Translate a label into `language`, returning the label unchanged when no
/// translation exists.
pub fn localize<'a>(language: &str, label: &'a str) -> &'a str {
    let table: &[(&str, &str)] = match language {
        "fr" => FR,
        "de" => DE,
        "es" => ES,
        _ => return label,
    };
    table
        .iter()
        .find(|(en, _)| *en == label)
        .map(|(_, translated)| *translated)
        .unwrap_or(label)
}

const FR: &[(&str, &str)] = &[
    ("Flight", "Vol"),
    ("Aircraft", "Avion"),
    ("Gate", "Porte"),
    ("Departs", "Départ"),
    ("Arrives", "Arrivée"),
    ("Passenger", "Passager"),
    ("Seat", "Siège"),
    (
        "I agree to the terms and conditions below",
        "J'accepte les termes et conditions ci-dessous",
    ),
];

const DE: &[(&str, &str)] = &[
    ("Flight", "Flug"),
    ("Aircraft", "Flugzeug"),
    ("Gate", "Tor"),
    ("Departs", "Abflug"),
    ("Arrives", "Ankunft"),
    ("Passenger", "Passagier"),
    ("Seat", "Sitz"),
    (
        "I agree to the terms and conditions below",
        "Ich stimme den unten stehenden Bedingungen zu",
    ),
];

const ES: &[(&str, &str)] = &[
    ("Flight", "Vuelo"),
    ("Aircraft", "Avión"),
    ("Gate", "Puerta"),
    ("Departs", "Sale"),
    ("Arrives", "Llega"),
    ("Passenger", "Pasajero"),
    ("Seat", "Asiento"),
    (
        "I agree to the terms and conditions below",
        "Acepto los términos y condiciones a continuación",
    ),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_translations() {
        assert_eq!(localize("fr", "Seat"), "Siège");
        assert_eq!(localize("de", "Gate"), "Tor");
        assert_eq!(localize("es", "Flight"), "Vuelo");
    }

    #[test]
    fn test_english_and_unknown_language_pass_through() {
        assert_eq!(localize("en", "Seat"), "Seat");
        assert_eq!(localize("it", "Seat"), "Seat");
    }

    #[test]
    fn test_unknown_label_passes_through() {
        assert_eq!(localize("fr", "Boarding Group"), "Boarding Group");
    }
}
