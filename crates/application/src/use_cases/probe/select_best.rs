use steer_dns_domain::{Candidate, EndpointReport, HostReport};

pub struct SelectBestUseCase;

impl SelectBestUseCase {
    /// Highest-throughput non-reference candidate. Candidates must be in
    /// discovery order; on a tie the earlier one wins.
    pub fn best(candidates: &[Candidate]) -> Option<&Candidate> {
        candidates
            .iter()
            .filter(|c| !c.is_reference() && c.throughput > 0.0)
            .fold(None, |best: Option<&Candidate>, c| match best {
                Some(b) if b.throughput >= c.throughput => Some(b),
                _ => Some(c),
            })
    }

    /// Report for one host, or `None` when nothing beat the filters.
    pub fn execute(candidates: &[Candidate]) -> Option<HostReport> {
        let best = Self::best(candidates)?;
        Some(HostReport {
            default: candidates
                .iter()
                .find(|c| c.is_default)
                .map(EndpointReport::from),
            best: EndpointReport::from(best),
            live: candidates
                .iter()
                .find(|c| c.is_live)
                .map(EndpointReport::from),
        })
    }
}
