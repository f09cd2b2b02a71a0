//! Visual theming for the force graph.
//!
//! Provides colors, the node fallback palette and per-element styles.

/// RGBA color representation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
	pub r: u8,
	pub g: u8,
	pub b: u8,
	pub a: f64,
}

impl Color {
	pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
		Self { r, g, b, a: 1.0 }
	}

	pub const fn rgba(r: u8, g: u8, b: u8, a: f64) -> Self {
		Self { r, g, b, a }
	}

	pub fn with_alpha(self, a: f64) -> Self {
		Self { a, ..self }
	}

	/// Parses `#RGB`, `#RRGGBB` and `rgb()`/`rgba()` notation.
	pub fn parse(css: &str) -> Option<Self> {
		let css = css.trim();
		if let Some(hex) = css.strip_prefix('#') {
			let channel = |s: &str| u8::from_str_radix(s, 16).ok();
			return match hex.len() {
				3 => {
					let mut digits = hex.chars().map(|c| channel(&c.to_string()).map(|v| v * 17));
					Some(Self::rgb(digits.next()??, digits.next()??, digits.next()??))
				}
				6 => Some(Self::rgb(
					channel(hex.get(0..2)?)?,
					channel(hex.get(2..4)?)?,
					channel(hex.get(4..6)?)?,
				)),
				_ => None,
			};
		}

		let body = css
			.strip_prefix("rgba(")
			.or_else(|| css.strip_prefix("rgb("))?
			.strip_suffix(')')?;
		let mut parts = body.split(',').map(str::trim);
		let r = parts.next()?.parse().ok()?;
		let g = parts.next()?.parse().ok()?;
		let b = parts.next()?.parse().ok()?;
		let a = match parts.next() {
			Some(a) => a.parse().ok()?,
			None => 1.0,
		};
		Some(Self::rgba(r, g, b, a))
	}

	pub fn to_css(self) -> String {
		if (self.a - 1.0).abs() < 0.001 {
			format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
		} else {
			format!("rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
		}
	}
}

/// Fill colors for nodes without an image.
#[derive(Clone, Debug)]
pub struct NodePalette {
	pub colors: Vec<Color>,
}

impl NodePalette {
	/// Muted, harmonious palette - slate blues and teals (default)
	pub fn slate() -> Self {
		Self {
			colors: vec![
				Color::rgb(94, 129, 172),  // Steel blue
				Color::rgb(129, 161, 193), // Light steel
				Color::rgb(100, 148, 160), // Teal gray
				Color::rgb(136, 160, 175), // Cadet blue
				Color::rgb(108, 142, 173), // Air force blue
				Color::rgb(119, 158, 165), // Desaturated cyan
				Color::rgb(143, 163, 180), // Cool gray
				Color::rgb(122, 153, 168), // Dusty blue
			],
		}
	}

	/// Color for the `index`-th node, cycling through the palette. `None` when
	/// the palette is empty.
	pub fn get(&self, index: usize) -> Option<Color> {
		index.checked_rem(self.colors.len()).map(|i| self.colors[i])
	}
}

/// Edge visual style.
#[derive(Clone, Debug)]
pub struct EdgeStyle {
	/// Stroke and arrowhead color unless a link overrides it
	pub color: Color,
	pub label_color: Color,
}

/// Node visual style.
#[derive(Clone, Debug)]
pub struct NodeStyle {
	/// Ring drawn around every node (alpha 0 = none)
	pub border_color: Color,
	pub label_color: Color,
}

/// Complete visual theme.
#[derive(Clone, Debug)]
pub struct Theme {
	pub background: Color,
	pub edge: EdgeStyle,
	pub node: NodeStyle,
	pub palette: NodePalette,
}

impl Theme {
	/// Light page with grey links (default)
	pub fn default_theme() -> Self {
		Self {
			background: Color::rgb(255, 255, 255),
			edge: EdgeStyle {
				color: Color::rgba(153, 153, 153, 0.6),
				label_color: Color::rgb(85, 85, 85),
			},
			node: NodeStyle {
				border_color: Color::rgb(255, 255, 255),
				label_color: Color::rgb(34, 34, 34),
			},
			palette: NodePalette::slate(),
		}
	}

	/// Fill of the `index`-th node. An empty palette falls back to the edge color.
	pub fn node_fill(&self, index: usize) -> Color {
		self.palette.get(index).unwrap_or(self.edge.color)
	}

	/// Stroke color of a link, honouring its own override.
	pub fn edge_color(&self, link_color: Option<&str>) -> String {
		match link_color {
			Some(css) => match Color::parse(css) {
				Some(color) => color.with_alpha(color.a * self.edge.color.a).to_css(),
				None => css.to_owned(),
			},
			None => self.edge.color.to_css(),
		}
	}
}

impl Default for Theme {
	fn default() -> Self {
		Self::default_theme()
	}
}
