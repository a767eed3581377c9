use std::collections::{BTreeMap, HashMap};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use chrono::{DateTime, TimeZone};

use crate::record::{Consolidated, Publication};

const TITLE: &str = "Diário Consolidado";

/// Occurrences per origin, counting every member of a duplicate group and
/// not just the canonical record.
pub fn origin_counts<'a>(
    publications: impl IntoIterator<Item = &'a Publication>,
    groups: &'a [Vec<Publication>],
) -> BTreeMap<&'a str, usize> {
    let by_process: HashMap<&str, &Vec<Publication>> =
        groups.iter().filter_map(|g| g.first().map(|p| (p.process_number.as_str(), g))).collect();

    let mut counts = BTreeMap::new();
    for p in publications {
        match by_process.get(p.process_number.as_str()) {
            Some(group) => {
                for member in group.iter() {
                    *counts.entry(member.origin.as_str()).or_insert(0) += 1;
                }
            }
            None => *counts.entry(p.origin.as_str()).or_insert(0) += 1,
        }
    }
    counts
}

/// Plain-text report, split into parts of at most `per_part` publications.
pub fn render_text<Tz: TimeZone>(
    out: &Consolidated,
    generated_at: &DateTime<Tz>,
    per_part: Option<usize>,
) -> Vec<String>
where
    Tz::Offset: std::fmt::Display,
{
    let stamp = generated_at.format("%d/%m/%Y %H:%M:%S").to_string();
    let size = per_part.filter(|&n| n > 0).unwrap_or(out.publications.len().max(1));
    if out.publications.is_empty() {
        return vec![render_part(&[], &out.duplicate_groups, &stamp)];
    }
    out.publications
        .chunks(size)
        .map(|part| render_part(part, &out.duplicate_groups, &stamp))
        .collect()
}

fn render_part(part: &[Publication], groups: &[Vec<Publication>], stamp: &str) -> String {
    let mut s = String::new();
    let duplicated = part.iter().filter(|p| !p.duplicate_of.is_empty()).count();

    let _ = writeln!(s, "{TITLE}");
    let _ = writeln!(s, "{}", "=".repeat(TITLE.chars().count()));
    let _ = writeln!(s, "Data de geração: {stamp}");
    let _ = writeln!(s, "Total de publicações nesta parte: {}", part.len());
    let _ = writeln!(s, " - Duplicados: {duplicated}");
    let _ = writeln!(s, "Publicações por arquivo:");
    for (origin, n) in origin_counts(part, groups) {
        let _ = writeln!(s, " - {origin}: {n}");
    }

    let total = part.len();
    for (i, p) in part.iter().enumerate() {
        let _ = writeln!(s, "\n{}", "-".repeat(40));
        let _ = writeln!(s, "Publicação {} de {}", i + 1, total);
        for line in p.raw_text.lines().map(str::trim).filter(|l| !l.is_empty()) {
            let _ = writeln!(s, "{line}");
        }
        if !p.duplicate_of.is_empty() {
            let _ = writeln!(s, "\nDuplicada também encontrada em:");
            for d in &p.duplicate_of {
                let _ = writeln!(s, " - {d}");
            }
        }
    }
    s
}

pub fn render_json(out: &Consolidated) -> serde_json::Result<String> {
    serde_json::to_string_pretty(out)
}

/// `relatorio.txt` → `relatorio_parte2.txt`.
pub fn part_path(base: &Path, part: usize) -> PathBuf {
    let stem = base.file_stem().map(|s| s.to_string_lossy().into_owned()).unwrap_or_default();
    let name = match base.extension() {
        Some(ext) => format!("{stem}_parte{part}.{}", ext.to_string_lossy()),
        None => format!("{stem}_parte{part}"),
    };
    base.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::classify::MovementType;
    use crate::parser::group::group;
    use chrono::Utc;

    fn publication(number: &str, origin: &str, kind: MovementType) -> Publication {
        Publication {
            process_number: number.into(),
            raw_text: format!("Publicação 1 de 1\n  {number}  \n\nConteudo: {kind}"),
            normalized_text: String::new(),
            movement_type: kind,
            header: "Publicação 1 de 1".into(),
            origin: origin.into(),
            position: "Publicação 1 de 1".into(),
            duplicate_of: Vec::new(),
        }
    }

    fn sample() -> Consolidated {
        group(&[
            publication("1234567-12.2024.8.26.0001", "a.txt", MovementType::Despacho),
            publication("1234567-12.2024.8.26.0001", "b.txt", MovementType::Sentenca),
            publication("7654321-12.2024.8.26.0001", "b.txt", MovementType::Decisao),
        ])
    }

    fn stamp() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 14, 9, 30, 0).unwrap()
    }

    #[test]
    fn counts_include_duplicate_members() {
        let out = sample();
        let counts = origin_counts(&out.publications, &out.duplicate_groups);
        assert_eq!(counts.get("a.txt"), Some(&1));
        assert_eq!(counts.get("b.txt"), Some(&2));
    }

    #[test]
    fn text_report() {
        let parts = render_text(&sample(), &stamp(), None);
        assert_eq!(parts.len(), 1);
        let r = &parts[0];
        assert!(r.starts_with("Diário Consolidado\n"));
        assert!(r.contains("Data de geração: 14/03/2024 09:30:00"));
        assert!(r.contains("Total de publicações nesta parte: 2"));
        assert!(r.contains(" - Duplicados: 1"));
        assert!(r.contains(" - b.txt: 2"));
        assert!(r.contains("Publicação 2 de 2"));
        assert!(r.contains("\n1234567-12.2024.8.26.0001\n"));
        assert!(r.contains("Duplicada também encontrada em:\n - Publicação 1 de 1 (b.txt) - Tipo: SENTENCA"));
    }

    #[test]
    fn report_parts() {
        let parts = render_text(&sample(), &stamp(), Some(1));
        assert_eq!(parts.len(), 2);
        assert!(parts[0].contains("Duplicada também encontrada em:"));
        assert!(!parts[1].contains("Duplicada também encontrada em:"));
        assert!(parts[1].contains(" - Duplicados: 0"));
    }

    #[test]
    fn empty_report() {
        let parts = render_text(&Consolidated::default(), &stamp(), Some(10));
        assert_eq!(parts.len(), 1);
        assert!(parts[0].contains("Total de publicações nesta parte: 0"));
    }

    #[test]
    fn json_shape() {
        let v: serde_json::Value = serde_json::from_str(&render_json(&sample()).unwrap()).unwrap();
        assert_eq!(v["publications"].as_array().unwrap().len(), 2);
        assert_eq!(v["duplicate_groups"][0].as_array().unwrap().len(), 2);
        assert_eq!(v["publications"][0]["duplicate_of"][0], "Publicação 1 de 1 (b.txt) - Tipo: SENTENCA");
    }

    #[test]
    fn part_file_names() {
        assert_eq!(part_path(Path::new("out/relatorio.txt"), 2), PathBuf::from("out/relatorio_parte2.txt"));
        assert_eq!(part_path(Path::new("relatorio"), 1), PathBuf::from("relatorio_parte1"));
    }
}
