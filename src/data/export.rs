use std::io::{Read, Write};

use serde::Serialize;

use super::error::Result;
use super::proximity::Neighbor;
use super::variant::VariantRecord;

pub const NEIGHBORS_FILE_NAME: &str = "nearby_residues.csv";
pub const VARIANTS_FILE_NAME: &str = "variant_level_data.csv";

/// Neighbour export columns, in write order.
pub const NEIGHBOR_COLUMNS: [&str; 7] = [
    "gene_name",
    "resno_y",
    "org_res",
    "Distance",
    "Count",
    "cluster_labels",
    "residue_position_id",
];

fn write_rows<W, T, I>(writer: W, header: &[&str], rows: I) -> Result<()>
where
    W: Write,
    T: Serialize,
    I: IntoIterator<Item = T>,
{
    // explicit header so an empty result still exports its columns
    let mut csv_writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    csv_writer.write_record(header)?;
    for row in rows {
        csv_writer.serialize(row)?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Write neighbours as CSV. Distances are written in shortest round-trip
/// form, so re-parsing yields the identical `f64`.
pub fn write_neighbors<W: Write>(writer: W, neighbors: &[Neighbor]) -> Result<()> {
    write_rows(writer, &NEIGHBOR_COLUMNS, neighbors)
}

pub fn neighbors_to_csv(neighbors: &[Neighbor]) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    write_neighbors(&mut buf, neighbors)?;
    Ok(buf)
}

/// Parse text produced by [`write_neighbors`], preserving row order.
pub fn parse_neighbors<R: Read>(reader: R) -> Result<Vec<Neighbor>> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let rows = csv_reader
        .deserialize::<Neighbor>()
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn write_variants<'a, W, I>(writer: W, variants: I) -> Result<()>
where
    W: Write,
    I: IntoIterator<Item = &'a VariantRecord>,
{
    write_rows(writer, &super::variant::VARIANT_COLUMNS, variants)
}

pub fn variants_to_csv<'a, I>(variants: I) -> Result<Vec<u8>>
where
    I: IntoIterator<Item = &'a VariantRecord>,
{
    let mut buf = Vec::new();
    write_variants(&mut buf, variants)?;
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CoercionPolicy;
    use crate::data::variant::VariantCatalog;

    fn neighbor(id: &str, distance: f64) -> Neighbor {
        Neighbor {
            gene_name: "BRAF".into(),
            resno: 600,
            org_res: "V".into(),
            distance,
            count: 7,
            cluster_label: "cluster, 2".into(),
            position_id: id.into(),
        }
    }

    #[test]
    fn neighbor_export_round_trips_exactly() {
        let rows = vec![
            neighbor("a", 0.1 + 0.2),
            neighbor("b", 2.0_f64.sqrt()),
            neighbor("c", 1e-12),
            neighbor("d", 3.0),
        ];
        let text = neighbors_to_csv(&rows).unwrap();
        let parsed = parse_neighbors(text.as_slice()).unwrap();
        assert_eq!(parsed, rows);
        for (p, r) in parsed.iter().zip(&rows) {
            assert_eq!(p.distance.to_bits(), r.distance.to_bits());
        }
    }

    #[test]
    fn neighbor_header_matches_download_columns() {
        let text = String::from_utf8(neighbors_to_csv(&[]).unwrap()).unwrap();
        assert_eq!(
            text.trim_end(),
            "gene_name,resno_y,org_res,Distance,Count,cluster_labels,residue_position_id"
        );
        assert!(parse_neighbors(text.as_bytes()).unwrap().is_empty());
    }

    #[test]
    fn variant_export_reloads_as_a_catalog() {
        let source = "Legacy Mutation ID,gene_name,resno,org_res,mut_res,Count\n\
COSM476,BRAF,600,V,E,120\n\
COSM473,BRAF,600,V,K,9\n";
        let catalog =
            VariantCatalog::from_csv_reader(source.as_bytes(), "inline", CoercionPolicy::Strict).unwrap();
        let text = variants_to_csv(catalog.filter("BRAF", 600)).unwrap();
        assert_eq!(String::from_utf8(text.clone()).unwrap(), source);

        let reloaded =
            VariantCatalog::from_csv_reader(text.as_slice(), "export", CoercionPolicy::Strict).unwrap();
        assert_eq!(reloaded.records(), catalog.records());
    }
}
