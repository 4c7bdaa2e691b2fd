/// 一次文本生成请求
///
/// 通过链式方法构建，构建完成后只读。
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    prompt: String,
    max_tokens: u32,
    temperature: f32,
    top_p: f32,
    top_k: u32,
    system_instruction: Option<String>,
    thinking_budget: Option<u32>,
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            max_tokens: 1000,
            temperature: 0.7,
            top_p: 0.95,
            top_k: 40,
            system_instruction: None,
            thinking_budget: None,
        }
    }

    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn top_p(mut self, top_p: f32) -> Self {
        self.top_p = top_p;
        self
    }

    pub fn top_k(mut self, top_k: u32) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn system_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.system_instruction = Some(instruction.into());
        self
    }

    pub fn thinking_budget(mut self, budget: Option<u32>) -> Self {
        self.thinking_budget = budget;
        self
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn max_output_tokens(&self) -> u32 {
        self.max_tokens
    }

    pub fn sampling_temperature(&self) -> f32 {
        self.temperature
    }

    pub fn nucleus_top_p(&self) -> f32 {
        self.top_p
    }

    pub fn sampling_top_k(&self) -> u32 {
        self.top_k
    }

    pub fn system(&self) -> Option<&str> {
        self.system_instruction.as_deref()
    }

    pub fn thinking(&self) -> Option<u32> {
        self.thinking_budget
    }
}
