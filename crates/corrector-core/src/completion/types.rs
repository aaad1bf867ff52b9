/// One request to the completion backend: the instruction pair produced by
/// the prompt builder. Model, sampling and output-length knobs belong to the
/// adapter, not to the request.
#[derive(Clone, Debug)]
pub struct CompletionRequest {
    pub system: String,
    pub user: String,
}
