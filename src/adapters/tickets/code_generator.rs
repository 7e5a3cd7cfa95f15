//! Random ticket code generator.
//!
//! Codes look like `TKT-7KQ2M9XH4RWD`: a fixed prefix and 12 characters from
//! an alphabet without look-alikes (no `0/O`, `1/I/L`), about 60 bits of
//! entropy. Uniqueness is still enforced by storage.

use rand::Rng;

use crate::domain::foundation::DomainError;
use crate::domain::ticket::TicketCode;
use crate::ports::TicketCodeGenerator;

const ALPHABET: &[u8] = b"23456789ABCDEFGHJKMNPQRSTUVWXYZ";
const CODE_LEN: usize = 12;
const PREFIX: &str = "TKT";

#[derive(Debug, Clone, Default)]
pub struct RandomTicketCodeGenerator;

impl RandomTicketCodeGenerator {
    pub fn new() -> Self {
        Self
    }
}

impl TicketCodeGenerator for RandomTicketCodeGenerator {
    fn generate(&self) -> Result<TicketCode, DomainError> {
        let mut rng = rand::thread_rng();
        let body: String = (0..CODE_LEN)
            .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
            .collect();
        Ok(TicketCode::new(format!("{}-{}", PREFIX, body))?)
    }
}
