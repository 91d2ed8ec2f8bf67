use chrono::{DateTime, Datelike, Utc};
use rand::{distributions::Alphanumeric, thread_rng, Rng};

pub fn generate_access_token(length: usize) -> String {
    thread_rng()
        .sample_iter(&Alphanumeric)
        .take(length)
        .map(char::from)
        .collect()
}

pub fn generate_otp() -> String {
    format!("{:06}", thread_rng().gen_range(0..1_000_000))
}

/// `CERT-<year>-<8 uppercase alphanumerics>`
pub fn generate_certificate_id(now: DateTime<Utc>) -> String {
    format!(
        "CERT-{}-{}",
        now.year(),
        generate_access_token(8).to_ascii_uppercase()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn otp_is_six_digits() {
        for _ in 0..50 {
            let otp = generate_otp();
            assert_eq!(otp.len(), 6);
            assert!(otp.chars().all(|c| c.is_ascii_digit()));
        }
    }

    #[test]
    fn certificate_id_shape() {
        let now = Utc::now();
        let id = generate_certificate_id(now);
        let parts: Vec<&str> = id.split('-').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "CERT");
        assert_eq!(parts[1], now.year().to_string());
        assert_eq!(parts[2].len(), 8);
        assert!(parts[2]
            .chars()
            .all(|c| c.is_ascii_digit() || c.is_ascii_uppercase()));
    }
}
