// AI pipeline plumbing: prompt construction, the gateway to the model
// provider, and response normalization. No other module talks to the
// provider directly — every model interaction goes through `gateway`.

pub mod gateway;
pub mod normalize;
pub mod prompts;
