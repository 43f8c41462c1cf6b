use crate::cli::{SummaryArgs, TermsArgs, TopicsArgs};
use crate::commands::shared;
use crate::io::{write_terms, write_topics};
use anyhow::Result;
use std::io::Write;

pub fn terms(args: TermsArgs) -> Result<()> {
    let model = shared::load_model(&args.model)?;
    let table = model.top_terms(args.n);
    let out = shared::open_output(args.output.as_deref())?;
    write_terms(out, &table, b'\t')?;
    Ok(())
}

pub fn topics(args: TopicsArgs) -> Result<()> {
    let model = shared::load_model(&args.model)?;
    let dominant = model.dominant_topics();
    let out = shared::open_output(args.output.as_deref())?;
    write_topics(out, model.documents(), &dominant, b'\t')?;
    Ok(())
}

pub fn summary(args: SummaryArgs) -> Result<()> {
    let model = shared::load_model(&args.model)?;
    let mut out = shared::open_output(None)?;
    writeln!(out, "{}", model)?;
    writeln!(
        out,
        "alpha = {}, beta = {}{}",
        format_alpha(model.alpha()),
        model.beta(),
        model
            .seed_weight()
            .map(|w| format!(", seed weight = {}", w))
            .unwrap_or_default()
    )?;
    writeln!(out, "topic\tshare")?;
    for (label, share) in model.labels().iter().zip(model.topic_shares()) {
        writeln!(out, "{}\t{:.4}", label, share)?;
    }
    out.flush()?;
    Ok(())
}

fn format_alpha(alpha: &[f64]) -> String {
    match alpha.first() {
        Some(first) if alpha.iter().all(|a| a == first) => first.to_string(),
        _ => format!("{:?}", alpha),
    }
}
