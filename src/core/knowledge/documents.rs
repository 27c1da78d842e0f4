use serde::{Deserialize, Serialize};

/// A topic document in the knowledge base.
///
/// Immutable once loaded; identity is position in load order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub title: String,
    /// Stored as "content" in the on-disk JSON form.
    #[serde(alias = "content")]
    pub body: String,
}

impl Document {
    pub fn new(title: &str, body: &str) -> Self {
        Self {
            title: title.to_string(),
            body: body.to_string(),
        }
    }

    /// The text form used for both embedding and keyword matching.
    pub fn combined_text(&self) -> String {
        format!("{}: {}", self.title, self.body)
    }
}

/// Built-in Malaysian loan knowledge, used when no knowledge directory is
/// present at startup.
pub fn default_documents() -> Vec<Document> {
    vec![
        Document::new(
            "Personal Loan Eligibility",
            "Malaysian personal loan eligibility requires: minimum age 18-21, maximum age 55-65, \
             minimum monthly income RM2,000-3,000, employment period minimum 6 months, CTOS score \
             above 600, debt service ratio below 60%.",
        ),
        Document::new(
            "Housing Loan Requirements",
            "Malaysian housing loan requires: minimum income RM3,000, down payment 10%-20%, \
             maximum loan tenure 35 years, debt service ratio below 70%, property valuation \
             report, legal fees 0.25%-1%.",
        ),
        Document::new(
            "Car Loan Guidelines",
            "Malaysian car loan guidelines: maximum 90% financing, tenure up to 9 years, minimum \
             income RM2,500, age limit 65 years, comprehensive insurance required, road tax and \
             registration fees.",
        ),
        Document::new(
            "CTOS Credit Report",
            "CTOS credit report shows payment history, outstanding debts, legal cases, \
             directorship information. Score ranges: 300-850, above 700 excellent, 650-699 good, \
             600-649 fair, below 600 poor. Cost RM25 per report.",
        ),
        Document::new(
            "Required Documents",
            "Standard loan documents: IC copy front/back, latest 3 months salary slip, latest 6 \
             months bank statement, EPF statement, employment letter, CTOS report. Additional for \
             housing: property documents, valuation report.",
        ),
    ]
}
