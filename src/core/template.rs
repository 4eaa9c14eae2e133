//! Property site HTML rendering.

use once_cell::sync::Lazy;
use serde::Serialize;
use tera::{Context, Tera};

use crate::domain::model::{ContactProfile, NeighborhoodInfo, PhotoAsset, SiteSubmission, Testimonial};
use crate::utils::error::Result;

const SITE_TEMPLATE_NAME: &str = "property.html";

/// Global template engine instance with the embedded site template.
static TEMPLATES: Lazy<Tera> = Lazy::new(|| {
    let mut tera = Tera::default();
    tera.add_raw_template(SITE_TEMPLATE_NAME, SITE_TEMPLATE)
        .expect("embedded site template must parse");
    tera.set_escape_fn(escape_html);
    tera
});

/// Escapes text for element content and quoted attributes. `/` is left alone so URLs stay readable.
fn escape_html(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

#[derive(Serialize)]
struct SiteView<'a> {
    title: String,
    property: PropertyView<'a>,
    contacts: [ContactView<'a>; 2],
    photos: Vec<PhotoView<'a>>,
    testimonials: Vec<&'a Testimonial>,
    neighborhood: Option<&'a NeighborhoodInfo>,
}

#[derive(Serialize)]
struct PropertyView<'a> {
    address: &'a str,
    city: &'a str,
    state: &'a str,
    zip: &'a str,
    price: Option<String>,
    bedrooms: Option<String>,
    bathrooms: Option<String>,
    square_feet: Option<String>,
    year_built: Option<String>,
    description: Option<&'a str>,
    features: Vec<&'a str>,
}

#[derive(Serialize)]
struct ContactView<'a> {
    role: &'static str,
    license_label: &'static str,
    name: &'a str,
    company: Option<&'a str>,
    license: Option<&'a str>,
    phone: &'a str,
    phone_href: String,
    email: &'a str,
    photo: Option<&'a str>,
}

#[derive(Serialize)]
struct PhotoView<'a> {
    src: &'a str,
    caption: Option<&'a str>,
}

fn non_blank(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

impl<'a> ContactView<'a> {
    fn from_profile(profile: &'a ContactProfile, role: &'static str, license_label: &'static str) -> Self {
        Self {
            role,
            license_label,
            name: profile.name.trim(),
            company: non_blank(&profile.company),
            license: non_blank(&profile.license),
            phone: profile.phone.trim(),
            phone_href: profile
                .phone
                .chars()
                .filter(|ch| ch.is_ascii_digit() || *ch == '+')
                .collect(),
            email: profile.email.trim(),
            photo: profile.photo.as_deref().and_then(non_blank),
        }
    }
}

impl<'a> PhotoView<'a> {
    fn from_asset(asset: &'a PhotoAsset) -> Option<Self> {
        Some(Self {
            src: non_blank(&asset.url)?,
            caption: asset.caption.as_deref().and_then(non_blank),
        })
    }
}

/// 以千分位格式化整數
fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, ch) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

/// `$1,234,567`，有零頭時才顯示小數
pub fn format_price(price: f64) -> String {
    let cents = (price * 100.0).round() as u64;
    let dollars = group_thousands(cents / 100);
    match cents % 100 {
        0 => format!("${}", dollars),
        rest => format!("${}.{:02}", dollars, rest),
    }
}

pub fn format_bathrooms(bathrooms: f32) -> String {
    if bathrooms.fract() == 0.0 {
        format!("{}", bathrooms as u32)
    } else {
        format!("{:.1}", bathrooms)
    }
}

/// Renders the complete HTML document for a submission.
///
/// Pure: no I/O, usable for both publishing and previews. Optional sections
/// (description, features, gallery, testimonials, neighborhood) are left out
/// entirely when they have no content or the neighborhood toggle is off.
pub fn render_site(submission: &SiteSubmission) -> Result<String> {
    let property = &submission.property;

    let view = SiteView {
        title: format!("{}, {}", property.address.trim(), property.city.trim()),
        property: PropertyView {
            address: property.address.trim(),
            city: property.city.trim(),
            state: property.state.trim(),
            zip: property.zip.trim(),
            price: property.price.map(format_price),
            bedrooms: property.bedrooms.map(|beds| beds.to_string()),
            bathrooms: property.bathrooms.map(format_bathrooms),
            square_feet: property.square_feet.map(|sqft| group_thousands(sqft as u64)),
            year_built: property.year_built.map(|year| year.to_string()),
            description: non_blank(&property.description),
            features: property.features.iter().filter_map(|f| non_blank(f)).collect(),
        },
        contacts: [
            ContactView::from_profile(&submission.realtor, "Listing Agent", "License #"),
            ContactView::from_profile(&submission.loan_officer, "Loan Officer", "NMLS #"),
        ],
        photos: submission.photos.iter().filter_map(PhotoView::from_asset).collect(),
        testimonials: submission
            .testimonials
            .iter()
            .filter(|t| non_blank(&t.quote).is_some())
            .collect(),
        neighborhood: submission.neighborhood.as_ref().filter(|n| n.enabled),
    };

    let context = Context::from_serialize(&view)?;
    Ok(TEMPLATES.render(SITE_TEMPLATE_NAME, &context)?)
}

// =============================================================================
// Embedded Template
// =============================================================================

const SITE_TEMPLATE: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{{ title }}</title>
    <style>
        :root {
            --bg: #ffffff;
            --bg-secondary: #f5f5f4;
            --foreground: #1c1917;
            --foreground-secondary: #57534e;
            --border: #e7e5e4;
            --accent: #0f766e;
        }
        * { box-sizing: border-box; margin: 0; padding: 0; }
        body {
            font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Helvetica, Arial, sans-serif;
            background: var(--bg);
            color: var(--foreground);
            line-height: 1.6;
        }
        .container { max-width: 1080px; margin: 0 auto; padding: 32px 24px; }
        .hero { border-bottom: 1px solid var(--border); padding-bottom: 24px; margin-bottom: 32px; }
        .hero h1 { font-size: 2rem; }
        .hero .location { color: var(--foreground-secondary); font-size: 1.1rem; }
        .hero .price { color: var(--accent); font-size: 1.75rem; font-weight: 700; margin-top: 8px; }
        .facts { display: flex; flex-wrap: wrap; gap: 24px; margin-top: 16px; }
        .fact .value { font-size: 1.25rem; font-weight: 600; }
        .fact .label { color: var(--foreground-secondary); font-size: 0.85rem; text-transform: uppercase; }
        section { margin-bottom: 40px; }
        section h2 { font-size: 1.35rem; margin-bottom: 12px; }
        .gallery { display: grid; grid-template-columns: repeat(auto-fill, minmax(280px, 1fr)); gap: 12px; }
        .gallery figure img { width: 100%; height: 220px; object-fit: cover; border-radius: 6px; }
        .gallery figcaption { color: var(--foreground-secondary); font-size: 0.9rem; }
        ul.bullets { padding-left: 20px; }
        .testimonial { background: var(--bg-secondary); border-radius: 6px; padding: 16px; margin-bottom: 12px; }
        .testimonial .author { color: var(--foreground-secondary); margin-top: 8px; }
        .contacts { display: grid; grid-template-columns: repeat(auto-fit, minmax(300px, 1fr)); gap: 24px; }
        .contact { border: 1px solid var(--border); border-radius: 8px; padding: 20px; display: flex; gap: 16px; }
        .contact img { width: 96px; height: 96px; border-radius: 50%; object-fit: cover; }
        .contact .role { color: var(--accent); font-size: 0.8rem; text-transform: uppercase; letter-spacing: 0.05em; }
        .contact a { color: var(--foreground); }
        footer { color: var(--foreground-secondary); font-size: 0.8rem; border-top: 1px solid var(--border); padding-top: 16px; }
    </style>
</head>
<body>
<div class="container">
    <header class="hero">
        <h1>{{ property.address }}</h1>
        <div class="location">{{ property.city }}, {{ property.state }} {{ property.zip }}</div>
        {% if property.price %}<div class="price">{{ property.price }}</div>{% endif %}
        <div class="facts">
            {% if property.bedrooms %}<div class="fact"><div class="value">{{ property.bedrooms }}</div><div class="label">Bedrooms</div></div>{% endif %}
            {% if property.bathrooms %}<div class="fact"><div class="value">{{ property.bathrooms }}</div><div class="label">Bathrooms</div></div>{% endif %}
            {% if property.square_feet %}<div class="fact"><div class="value">{{ property.square_feet }}</div><div class="label">Sq Ft</div></div>{% endif %}
            {% if property.year_built %}<div class="fact"><div class="value">{{ property.year_built }}</div><div class="label">Year Built</div></div>{% endif %}
        </div>
    </header>

    {% if photos | length > 0 %}
    <section class="gallery-section">
        <h2>Photos</h2>
        <div class="gallery">
            {% for photo in photos %}
            <figure>
                <img src="{{ photo.src }}" alt="{% if photo.caption %}{{ photo.caption }}{% else %}Photo {{ loop.index }}{% endif %}" loading="lazy">
                {% if photo.caption %}<figcaption>{{ photo.caption }}</figcaption>{% endif %}
            </figure>
            {% endfor %}
        </div>
    </section>
    {% endif %}

    {% if property.description %}
    <section class="description">
        <h2>About This Home</h2>
        <p>{{ property.description }}</p>
    </section>
    {% endif %}

    {% if property.features | length > 0 %}
    <section class="features">
        <h2>Features</h2>
        <ul class="bullets">
            {% for feature in property.features %}<li>{{ feature }}</li>
            {% endfor %}
        </ul>
    </section>
    {% endif %}

    {% if neighborhood %}
    <section class="neighborhood">
        <h2>The Neighborhood</h2>
        {% if neighborhood.description %}<p>{{ neighborhood.description }}</p>{% endif %}
        {% if neighborhood.highlights | length > 0 %}
        <ul class="bullets">
            {% for highlight in neighborhood.highlights %}<li>{{ highlight }}</li>
            {% endfor %}
        </ul>
        {% endif %}
    </section>
    {% endif %}

    {% if testimonials | length > 0 %}
    <section class="testimonials">
        <h2>What Clients Say</h2>
        {% for testimonial in testimonials %}
        <blockquote class="testimonial">
            <p>&ldquo;{{ testimonial.quote }}&rdquo;</p>
            {% if testimonial.author %}<div class="author">&mdash; {{ testimonial.author }}</div>{% endif %}
        </blockquote>
        {% endfor %}
    </section>
    {% endif %}

    <section class="contact-section">
        <h2>Contact Us</h2>
        <div class="contacts">
            {% for contact in contacts %}
            <div class="contact">
                {% if contact.photo %}<img src="{{ contact.photo }}" alt="{{ contact.name }}">{% endif %}
                <div>
                    <div class="role">{{ contact.role }}</div>
                    <h3>{{ contact.name }}</h3>
                    {% if contact.company %}<div>{{ contact.company }}</div>{% endif %}
                    {% if contact.license %}<div>{{ contact.license_label }}{{ contact.license }}</div>{% endif %}
                    <div><a href="tel:{{ contact.phone_href }}">{{ contact.phone }}</a></div>
                    <div><a href="mailto:{{ contact.email }}">{{ contact.email }}</a></div>
                </div>
            </div>
            {% endfor %}
        </div>
    </section>

    <footer>
        {{ property.address }}, {{ property.city }}, {{ property.state }} {{ property.zip }}
    </footer>
</div>
</body>
</html>
"##;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{PropertyRecord, Testimonial};

    fn submission() -> SiteSubmission {
        SiteSubmission {
            property: PropertyRecord {
                address: "123 Main St".to_string(),
                city: "Springfield".to_string(),
                state: "IL".to_string(),
                zip: "62701".to_string(),
                price: Some(1_234_567.0),
                bedrooms: Some(4),
                bathrooms: Some(2.5),
                square_feet: Some(2150),
                year_built: Some(1998),
                description: "Sunny colonial with a big yard.".to_string(),
                features: vec!["Hardwood floors".to_string()],
            },
            realtor: ContactProfile {
                name: "Ann Agent".to_string(),
                company: "Main Realty".to_string(),
                license: "RE-555".to_string(),
                phone: "(555) 010-0100".to_string(),
                email: "ann@example.com".to_string(),
                photo: None,
            },
            loan_officer: ContactProfile {
                name: "Lou Lender".to_string(),
                company: "First Mortgage".to_string(),
                license: "123456".to_string(),
                phone: "555-010-0200".to_string(),
                email: "lou@example.com".to_string(),
                photo: Some("images/lou.jpg".to_string()),
            },
            photos: vec![
                PhotoAsset {
                    url: "images/front.jpg".to_string(),
                    caption: Some("Front yard".to_string()),
                },
                PhotoAsset {
                    url: "https://cdn.example.com/kitchen.jpg".to_string(),
                    caption: None,
                },
            ],
            testimonials: Vec::new(),
            neighborhood: None,
        }
    }

    #[test]
    fn test_render_contains_required_fields() {
        let html = render_site(&submission()).unwrap();

        for value in [
            "123 Main St",
            "Springfield",
            "IL",
            "62701",
            "$1,234,567",
            "Ann Agent",
            "(555) 010-0100",
            "ann@example.com",
            "Lou Lender",
            "555-010-0200",
            "lou@example.com",
            "NMLS #123456",
            "License #RE-555",
        ] {
            assert!(html.contains(value), "missing {value}");
        }
        assert!(html.contains("2.5"));
        assert!(html.contains("2,150"));
        assert!(html.contains("tel:5550100200"));
    }

    #[test]
    fn test_render_preserves_photo_order() {
        let html = render_site(&submission()).unwrap();
        let front = html.find("images/front.jpg").unwrap();
        let kitchen = html.find("https://cdn.example.com/kitchen.jpg").unwrap();
        assert!(front < kitchen);
        assert!(html.contains("<figcaption>Front yard</figcaption>"));
    }

    #[test]
    fn test_optional_sections_omitted() {
        let mut site = submission();
        site.neighborhood = Some(NeighborhoodInfo {
            enabled: false,
            description: "Walkable streets".to_string(),
            highlights: vec!["Parks".to_string()],
        });
        site.photos.clear();

        let html = render_site(&site).unwrap();
        assert!(!html.contains("The Neighborhood"));
        assert!(!html.contains("Walkable streets"));
        assert!(!html.contains("What Clients Say"));
        assert!(!html.contains("class=\"gallery-section\""));
    }

    #[test]
    fn test_optional_sections_rendered_when_present() {
        let mut site = submission();
        site.neighborhood = Some(NeighborhoodInfo {
            enabled: true,
            description: "Walkable streets".to_string(),
            highlights: vec!["Parks".to_string()],
        });
        site.testimonials = vec![Testimonial {
            quote: "Closed in two weeks!".to_string(),
            author: "The Smiths".to_string(),
        }];

        let html = render_site(&site).unwrap();
        assert!(html.contains("The Neighborhood"));
        assert!(html.contains("Walkable streets"));
        assert!(html.contains("Closed in two weeks!"));
        assert!(html.contains("The Smiths"));
    }

    #[test]
    fn test_values_are_escaped() {
        let mut site = submission();
        site.property.description = "<script>alert(1)</script>".to_string();

        let html = render_site(&site).unwrap();
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn test_format_helpers() {
        assert_eq!(format_price(450_000.0), "$450,000");
        assert_eq!(format_price(999.5), "$999.50");
        assert_eq!(format_price(0.0), "$0");
        assert_eq!(format_bathrooms(2.0), "2");
        assert_eq!(format_bathrooms(1.5), "1.5");
    }
}
