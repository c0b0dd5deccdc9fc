//! Display names for navigation entries

/// Initialisms that keep their canonical casing in display names
pub const ACRONYMS: &[&str] = &[
    "DTC", "OBD", "VIN", "EGR", "PCV", "LF", "MAF", "IAT", "CPP", "PSP", "ECT", "PCM", "CKP",
    "CMP", "TP", "APP", "HO2S", "MAP", "KS", "BARO", "SST", "ABS", "DSC", "HU", "CM", "VSS",
    "TR", "ATF", "KOEO", "KOER", "PID", "CD", "MP3", "AudioPilot", "ALC", "BOSE", "MIL", "AT",
    "MT", "WM", "SJ6A", "EL", "ESA", "EVAP", "OCV",
];

/// Title-cases every word of `segment`, restoring known initialisms
///
/// A word is a maximal run of alphanumeric characters; everything between
/// words is kept as is.
///
/// # Examples
///
/// ```
/// use wsm_mirror::site::display_name;
///
/// assert_eq!(display_name("ON-BOARD DIAGNOSTIC (OBD)"), "On-Board Diagnostic (OBD)");
/// assert_eq!(display_name("ho2s heater"), "HO2S Heater");
/// ```
pub fn display_name(segment: &str) -> String {
    let mut out = String::with_capacity(segment.len());
    let mut word = String::new();

    for c in segment.chars() {
        if c.is_alphanumeric() {
            word.push(c);
        } else {
            flush_word(&mut out, &mut word);
            out.push(c);
        }
    }
    flush_word(&mut out, &mut word);

    out
}

fn flush_word(out: &mut String, word: &mut String) {
    if word.is_empty() {
        return;
    }

    match ACRONYMS.iter().find(|a| a.eq_ignore_ascii_case(word)) {
        Some(acronym) => out.push_str(acronym),
        None => {
            let mut chars = word.chars();
            if let Some(first) = chars.next() {
                out.extend(first.to_uppercase());
                out.extend(chars.flat_map(char::to_lowercase));
            }
        }
    }

    word.clear();
}
