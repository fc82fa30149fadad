use chrono::NaiveDate;
use serde::Deserialize;
use std::error::Error;
use std::fs::File;

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    pub data: String,
    pub listen: String,
    pub holidays: Vec<String>,
    pub holiday_window_days: i32,
}

impl Default for Config {
    fn default() -> Config {
        Config {
            data: "data/netflix_content_2023.csv".to_string(),
            listen: "127.0.0.1:8050".to_string(),
            holidays: vec![
                "2023-01-01".to_string(), // new year's day
                "2023-02-14".to_string(), // valentine's day
                "2023-07-04".to_string(), // independence day (US)
                "2023-10-31".to_string(), // halloween
                "2023-12-25".to_string(), // christmas day
            ],
            holiday_window_days: 3,
        }
    }
}

impl Config {
    pub fn load(filename: &str) -> Result<Config, Box<dyn Error>> {
        let reader = File::open(filename)?;
        let config: Config = serde_yaml::from_reader(reader)?;
        Ok(config)
    }

    /// Holiday strings parsed as `%Y-%m-%d`; a malformed entry is an error.
    pub fn holiday_dates(&self) -> Result<Vec<NaiveDate>, Box<dyn Error>> {
        let mut dates = Vec::with_capacity(self.holidays.len());
        for s in &self.holidays {
            dates.push(NaiveDate::parse_from_str(s, "%Y-%m-%d")?);
        }
        Ok(dates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config() {
        let content = r##"data: data/releases.csv
listen: 0.0.0.0:9000
holidays:
  - 2023-01-01
  - 2023-12-25
holiday_window_days: 2
"##;
        let config: Config = serde_yaml::from_str(content).unwrap();
        println!("{:?}", config);
        assert_eq!(config.data, "data/releases.csv");
        assert_eq!(config.listen, "0.0.0.0:9000");
        assert_eq!(config.holidays, &["2023-01-01", "2023-12-25"]);
        assert_eq!(config.holiday_window_days, 2);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: Config = serde_yaml::from_str("data: other.csv\n").unwrap();
        assert_eq!(config.data, "other.csv");
        assert_eq!(config.listen, "127.0.0.1:8050");
        assert_eq!(config.holidays.len(), 5);
        assert_eq!(config.holiday_window_days, 3);
    }

    #[test]
    fn test_holiday_dates() {
        let config = Config::default();
        let dates = config.holiday_dates().unwrap();
        assert_eq!(dates[0], NaiveDate::from_ymd_opt(2023, 1, 1).unwrap());
        assert_eq!(dates[4], NaiveDate::from_ymd_opt(2023, 12, 25).unwrap());

        let bad = Config {
            holidays: vec!["christmas".to_string()],
            ..Config::default()
        };
        assert!(bad.holiday_dates().is_err());
    }
}
