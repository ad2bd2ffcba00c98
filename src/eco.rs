// ECO codes (e.g. "B45") grouped into their named opening families
// ("B20-B99", Sicilian). Anything unparseable lands in the Unknown family.

use std::collections::BTreeMap;

use crate::model::{ResultCounter, UNKNOWN};

/// One contiguous range of ECO codes, inclusive on both ends.
#[derive(Debug, Clone, Copy)]
pub struct EcoFamily {
    pub first: &'static str,
    pub last: &'static str,
    pub name: &'static str,
}

impl EcoFamily {
    pub fn label(&self) -> String {
        if self.first == self.last {
            self.first.to_string()
        } else {
            format!("{}-{}", self.first, self.last)
        }
    }

    fn contains(&self, code: u16) -> bool {
        match (eco_index(self.first), eco_index(self.last)) {
            (Some(lo), Some(hi)) => (lo..=hi).contains(&code),
            _ => false,
        }
    }
}

const fn fam(first: &'static str, last: &'static str, name: &'static str) -> EcoFamily {
    EcoFamily { first, last, name }
}

pub static FAMILIES: &[EcoFamily] = &[
    fam("A00", "A00", "Polish (Sokolsky)"),
    fam("A01", "A01", "Nimzovich-Larsen"),
    fam("A02", "A03", "Bird's Opening"),
    fam("A04", "A09", "Reti"),
    fam("A10", "A39", "English"),
    fam("A40", "A41", "Queen's Pawn"),
    fam("A42", "A42", "Modern (Averbakh)"),
    fam("A43", "A44", "Old Benoni"),
    fam("A45", "A46", "Queen's Pawn Game"),
    fam("A47", "A47", "Queen's Indian"),
    fam("A48", "A49", "East Indian"),
    fam("A50", "A50", "Queen's Pawn Game"),
    fam("A51", "A52", "Budapest"),
    fam("A53", "A55", "Old Indian"),
    fam("A56", "A56", "Benoni"),
    fam("A57", "A59", "Benko Gambit"),
    fam("A60", "A79", "Modern Benoni"),
    fam("A80", "A99", "Dutch"),
    fam("B00", "B00", "King's Pawn Opening"),
    fam("B01", "B01", "Scandinavian"),
    fam("B02", "B05", "Alekhine"),
    fam("B06", "B06", "Modern (Robatsch)"),
    fam("B07", "B09", "Pirc"),
    fam("B10", "B19", "Caro-Kann"),
    fam("B20", "B99", "Sicilian"),
    fam("C00", "C19", "French"),
    fam("C20", "C20", "King's Pawn Game"),
    fam("C21", "C22", "Centre Game"),
    fam("C23", "C24", "Bishop's Opening"),
    fam("C25", "C29", "Vienna"),
    fam("C30", "C39", "King's Gambit"),
    fam("C40", "C40", "King's Knight Opening"),
    fam("C41", "C41", "Philidor"),
    fam("C42", "C43", "Petrov"),
    fam("C44", "C44", "King's Pawn Game"),
    fam("C45", "C45", "Scotch"),
    fam("C46", "C46", "Three Knights"),
    fam("C47", "C49", "Four Knights"),
    fam("C50", "C50", "Italian Game"),
    fam("C51", "C52", "Evans Gambit"),
    fam("C53", "C54", "Giuoco Piano"),
    fam("C55", "C59", "Two Knights"),
    fam("C60", "C99", "Ruy Lopez"),
    fam("D00", "D00", "Queen's Pawn Game"),
    fam("D01", "D01", "Richter-Veresov"),
    fam("D02", "D02", "Queen's Pawn Game"),
    fam("D03", "D03", "Torre Attack"),
    fam("D04", "D05", "Queen's Pawn Game"),
    fam("D06", "D06", "Queen's Gambit"),
    fam("D07", "D09", "Chigorin"),
    fam("D10", "D15", "Slav"),
    fam("D16", "D16", "Slav Accepted"),
    fam("D17", "D19", "Slav, Czech"),
    fam("D20", "D29", "Queen's Gambit Accepted"),
    fam("D30", "D42", "Queen's Gambit Declined"),
    fam("D43", "D49", "Semi-Slav"),
    fam("D50", "D69", "QGD 4.Bg5"),
    fam("D70", "D79", "Neo-Grunfeld"),
    fam("D80", "D99", "Grunfeld"),
    fam("E00", "E00", "Queen's Pawn Game"),
    fam("E01", "E09", "Catalan"),
    fam("E10", "E10", "Queen's Pawn Game"),
    fam("E11", "E11", "Bogo-Indian"),
    fam("E12", "E19", "Queen's Indian"),
    fam("E20", "E59", "Nimzo-Indian"),
    fam("E60", "E99", "King's Indian"),
];

/// "A00".."E99" => 0..499; `None` for anything else.
fn eco_index(s: &str) -> Option<u16> {
    let s = s.trim().to_ascii_uppercase();
    if s.len() != 3 {
        return None;
    }
    let mut it = s.chars();
    let letter = it.next()?;
    if !('A'..='E').contains(&letter) {
        return None;
    }
    let d1 = it.next()?.to_digit(10)? as u16;
    let d2 = it.next()?.to_digit(10)? as u16;
    Some((letter as u16 - 'A' as u16) * 100 + d1 * 10 + d2)
}

pub fn family_for(eco: &str) -> Option<&'static EcoFamily> {
    let code = eco_index(eco)?;
    FAMILIES.iter().find(|f| f.contains(code))
}

/// Fold per-code counters into per-family counters, keyed by family label.
/// Values are `(family name, counter)`.
pub fn family_performance(
    eco_codes: &BTreeMap<String, ResultCounter>,
) -> BTreeMap<String, (&'static str, ResultCounter)> {
    let mut out: BTreeMap<String, (&'static str, ResultCounter)> = BTreeMap::new();
    for (code, c) in eco_codes {
        let (label, name) = match family_for(code) {
            Some(f) => (f.label(), f.name),
            None => (UNKNOWN.to_string(), UNKNOWN),
        };
        let slot = out.entry(label).or_insert((name, ResultCounter::default()));
        slot.1.wins += c.wins;
        slot.1.losses += c.losses;
        slot.1.draws += c.draws;
        slot.1.total += c.total;
    }
    out
}
