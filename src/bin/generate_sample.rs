use std::collections::BTreeSet;
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use arrow::util::pretty::print_batches;
use parquet::arrow::ArrowWriter;

use kinase_explorer::data::export::write_variants;
use kinase_explorer::data::residue::RESIDUE_COLUMNS;
use kinase_explorer::VariantRecord;

const AMINO_ACIDS: &[u8] = b"ACDEFGHIKLMNPQRSTVWY";

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }

    fn below(&mut self, n: u64) -> u64 {
        self.next_u64() % n
    }

    fn residue_letter(&mut self) -> char {
        AMINO_ACIDS[self.below(AMINO_ACIDS.len() as u64) as usize] as char
    }
}

struct SampleResidue {
    gene: &'static str,
    resno: i64,
    org_res: char,
    effects: [u64; 7],
    cluster: i64,
    model: i64,
    xyz: [f64; 3],
}

impl SampleResidue {
    fn position_id(&self) -> String {
        format!("{}_{}_{}", self.gene, self.resno, self.model)
    }

    fn count(&self) -> u64 {
        self.effects.iter().sum()
    }
}

/// Residues laid out along an α-helix-like path (≈3.8 Å between
/// consecutive positions), with every fourth residue also resolved in a
/// second, slightly shifted model.
fn generate_residues(rng: &mut SimpleRng) -> Vec<SampleResidue> {
    let kinases: [(&str, i64, i64); 3] = [("BRAF", 590, 610), ("EGFR", 780, 800), ("KIT", 810, 825)];

    let mut rows = Vec::new();
    for (k, &(gene, first, last)) in kinases.iter().enumerate() {
        let offset = k as f64 * 40.0;
        for resno in first..=last {
            let t = (resno - first) as f64 * 100f64.to_radians();
            let base = [
                offset + 2.3 * t.cos(),
                2.3 * t.sin(),
                1.5 * (resno - first) as f64,
            ];
            let org_res = rng.residue_letter();
            let mut effects = [0u64; 7];
            for e in &mut effects {
                *e = if rng.next_f64() < 0.4 { rng.below(6) } else { 0 };
            }
            let cluster = k as i64 * 10 + (resno - first) / 5;

            let models = if (resno - first) % 4 == 0 { 2 } else { 1 };
            for model in 1..=models {
                let jitter = if model == 1 { 0.05 } else { 0.6 };
                rows.push(SampleResidue {
                    gene,
                    resno,
                    org_res,
                    effects,
                    cluster,
                    model,
                    xyz: base.map(|c| rng.gauss(c, jitter)),
                });
            }
        }
    }
    rows
}

fn generate_variants(residues: &[SampleResidue], rng: &mut SimpleRng) -> Vec<VariantRecord> {
    let mut next_id = 1000u64;
    let mut variants = Vec::new();
    for r in residues.iter().filter(|r| r.model == 1 && r.count() > 0) {
        for _ in 0..=rng.below(2) {
            let mut mut_res = rng.residue_letter();
            while mut_res == r.org_res {
                mut_res = rng.residue_letter();
            }
            variants.push(VariantRecord {
                legacy_id: format!("COSM{next_id}"),
                gene_name: r.gene.to_string(),
                resno: r.resno,
                org_res: r.org_res.to_string(),
                mut_res: mut_res.to_string(),
                count: 1 + rng.below(r.count()),
            });
            next_id += 1;
        }
    }
    variants
}

fn write_residues_csv(path: &str, residues: &[SampleResidue]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).with_context(|| format!("creating {path}"))?;
    writer.write_record(RESIDUE_COLUMNS)?;
    for r in residues {
        let mut record = vec![
            r.gene.to_string(),
            r.resno.to_string(),
            r.org_res.to_string(),
            r.count().to_string(),
        ];
        record.extend(r.effects.iter().map(|e| e.to_string()));
        record.push(r.cluster.to_string());
        record.push(r.model.to_string());
        record.extend(r.xyz.iter().map(|c| format!("{c:.3}")));
        record.push(r.position_id());
        writer.write_record(&record)?;
    }
    writer.flush()?;
    Ok(())
}

fn string_column(residues: &[SampleResidue], f: impl Fn(&SampleResidue) -> String) -> ArrayRef {
    Arc::new(StringArray::from(residues.iter().map(f).collect::<Vec<_>>()))
}

fn int_column(residues: &[SampleResidue], f: impl Fn(&SampleResidue) -> i64) -> ArrayRef {
    Arc::new(Int64Array::from(residues.iter().map(f).collect::<Vec<_>>()))
}

/// Same columns as the CSV, typed the way `df.to_parquet()` would write them.
fn residue_batch(residues: &[SampleResidue]) -> Result<RecordBatch> {
    let mut columns: Vec<(&str, DataType, ArrayRef)> = vec![
        ("gene_name", DataType::Utf8, string_column(residues, |r| r.gene.to_string())),
        ("resno_y", DataType::Int64, int_column(residues, |r| r.resno)),
        ("org_res", DataType::Utf8, string_column(residues, |r| r.org_res.to_string())),
        ("Count", DataType::Int64, int_column(residues, |r| r.count() as i64)),
    ];
    for (i, &name) in RESIDUE_COLUMNS[4..11].iter().enumerate() {
        columns.push((name, DataType::Int64, int_column(residues, |r| r.effects[i] as i64)));
    }
    columns.push(("cluster_labels", DataType::Int64, int_column(residues, |r| r.cluster)));
    columns.push(("model_no", DataType::Int64, int_column(residues, |r| r.model)));
    for (axis, name) in ["x", "y", "z"].into_iter().enumerate() {
        let coords: ArrayRef =
            Arc::new(Float64Array::from(residues.iter().map(|r| r.xyz[axis]).collect::<Vec<_>>()));
        columns.push((name, DataType::Float64, coords));
    }
    columns.push((
        "residue_position_id",
        DataType::Utf8,
        string_column(residues, |r| r.position_id()),
    ));

    let (fields, arrays): (Vec<Field>, Vec<ArrayRef>) = columns
        .into_iter()
        .map(|(name, data_type, array)| (Field::new(name, data_type, false), array))
        .unzip();
    let batch = RecordBatch::try_new(Arc::new(Schema::new(fields)), arrays)
        .context("assembling residue record batch")?;
    Ok(batch)
}

fn main() -> Result<()> {
    env_logger::init();
    let mut rng = SimpleRng::new(42);

    let residues = generate_residues(&mut rng);
    let variants = generate_variants(&residues, &mut rng);

    write_residues_csv("sample_residues.csv", &residues)?;

    let file = std::fs::File::create("sample_variants.csv").context("creating sample_variants.csv")?;
    write_variants(file, &variants).context("writing sample_variants.csv")?;

    // Write Parquet
    let batch = residue_batch(&residues)?;
    let output_path = "sample_residues.parquet";
    let file = std::fs::File::create(output_path).context("creating output file")?;
    let mut writer = ArrowWriter::try_new(file, batch.schema(), None).context("creating parquet writer")?;
    writer.write(&batch).context("writing batch")?;
    writer.close().context("closing parquet writer")?;

    print_batches(&[batch.slice(0, batch.num_rows().min(5))]).context("printing preview")?;
    let kinases: BTreeSet<&str> = residues.iter().map(|r| r.gene).collect();
    println!(
        "Wrote {} residues ({} kinases) to sample_residues.csv / {output_path} and {} variants to sample_variants.csv",
        residues.len(),
        kinases.len(),
        variants.len()
    );
    Ok(())
}
