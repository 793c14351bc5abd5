/* Copyright © 2024-2025 Adam Train <adam@adamtrain.net>
 *
 * This program is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * This program is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with this program. If not, see <https://www.gnu.org/licenses/>.
 */
use crate::config::config_file::Config;
use anyhow::{anyhow, bail, Context, Error};
use dirs::home_dir;
use log::debug;
use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;

pub struct Filesystem {
	/// Set of input paths that have been read.
	/// Used to catch the same rate file being passed twice, which would
	/// otherwise surface later as a wall of overlapping intervals.
	read_files: HashSet<String>,
}

impl Filesystem {
	pub fn new() -> Self {
		Self {
			read_files: HashSet::new(),
		}
	}

	pub fn declare_file(&mut self, file_path: &str) -> Result<(), Error> {
		if self.read_files.contains(file_path) {
			bail!("File given more than once: {}", file_path)
		}
		self.read_files.insert(file_path.to_string());
		Ok(())
	}

	/// Reads a whole input table. Text that is not valid UTF-8 is taken as
	/// ISO-8859-1, which is what HMRC publishes its rate files in.
	pub fn read_text(&mut self, file_path: &str) -> Result<String, Error> {
		self.declare_file(file_path)?;

		let bytes = fs::read(file_path)
			.with_context(|| format!("unable to read {}", file_path))?;

		Ok(decode(bytes))
	}

	/// Fetches the config from the given path, or default path if none.
	/// A missing file at the default path just means defaults; a custom
	/// path has to exist.
	pub fn get_config(
		&self,
		custom_config_path: Option<&String>,
	) -> Result<Config, Error> {
		let config_path = match &custom_config_path {
			None => match home_dir() {
				Some(home) => home.join(".config/poolbasis/config.toml"),
				None => return Ok(Config::default()),
			},
			Some(p) => PathBuf::from(p),
		};

		if !config_path.exists() {
			if custom_config_path.is_some() {
				bail!("Config file not found: {}", config_path.display());
			}
			return Ok(Config::default());
		}

		debug!("Reading config from {}", config_path.display());
		let content = fs::read_to_string(&config_path)?;
		let config: Config = toml::from_str(&content)
			.map_err(|e| anyhow!("failed to parse config: {}", e))?;

		Ok(config)
	}
}

fn decode(bytes: Vec<u8>) -> String {
	match String::from_utf8(bytes) {
		Ok(text) => text,
		// every byte of Latin-1 is the code point of the same value
		Err(e) => e.into_bytes().iter().map(|&b| b as char).collect(),
	}
}
