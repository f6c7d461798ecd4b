//! The fixed client-stub template and its renderer.
//!
//! The template body deliberately carries no import block: the import
//! normalization pass derives it from the identifiers the expansion
//! actually uses.

use serde::Serialize;
use stubgen_core::ServiceDescription;

/// Template or expansion failure. A malformed template is a
/// configuration-time error surfaced by [`StubRenderer::new`].
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("stub template is malformed: {0}")]
    Template(#[source] minijinja::Error),
    #[error("stub template expansion failed: {0}")]
    Expand(#[source] minijinja::Error),
}

const CLIENT_TEMPLATE: &str = r#"package {{ package }}

func init() {
{%- for m in methods %}
	gob.Register({{ m.response_type }}{})
	gob.Register({{ m.request_payload }}{})
{%- endfor %}
}

type {{ name }}Client struct {
	client *rpc.Client
}

func New{{ name }}Client(address string) (*{{ name }}Client, error) {
	client, err := rpc.Dial("tcp", address)
	if err != nil {
		return nil, fmt.Errorf("{{ package }}.New{{ name }}Client rpc.Dial error: %w", err)
	}

	return &{{ name }}Client{client: client}, nil
}
{% for m in methods %}
func (c *{{ name }}Client) {{ m.name }}(request {{ m.request_type }}) (*{{ m.response_type }}, error) {
	var response {{ m.response_type }}
	err := c.client.Call("{{ name }}.{{ m.name }}", request, &response)
	if err != nil {
		return nil, fmt.Errorf("{{ package }}.{{ name }}Client.{{ m.name }} Call error: %w", err)
	}

	return &response, nil
}
{% endfor %}
func (c *{{ name }}Client) Close() error {
	return c.client.Close()
}
"#;

/// The renderer's per-method view: the declared request spelling for the
/// method signature plus the marker-stripped payload for registration.
#[derive(Serialize)]
struct MethodContext<'a> {
    name: &'a str,
    request_type: &'a str,
    request_payload: &'a str,
    response_type: &'a str,
}

/// Expands the fixed stub template against service descriptions.
pub struct StubRenderer {
    env: minijinja::Environment<'static>,
}

impl StubRenderer {
    /// Compile the stub template once.
    pub fn new() -> Result<Self, RenderError> {
        let mut env = minijinja::Environment::new();
        env.set_keep_trailing_newline(true);
        env.add_template("client.go", CLIENT_TEMPLATE)
            .map_err(RenderError::Template)?;
        Ok(Self { env })
    }

    /// Render one service description into Go client-stub source text.
    ///
    /// Deterministic: identical descriptions yield byte-identical text.
    pub fn render(&self, service: &ServiceDescription) -> Result<String, RenderError> {
        let methods: Vec<MethodContext<'_>> = service
            .methods
            .iter()
            .map(|m| MethodContext {
                name: &m.name,
                request_type: &m.request_type,
                request_payload: m.request_payload(),
                response_type: &m.response_type,
            })
            .collect();

        let template = self
            .env
            .get_template("client.go")
            .map_err(RenderError::Template)?;
        template
            .render(minijinja::context! {
                package => service.package,
                name => service.name,
                methods => methods,
            })
            .map_err(RenderError::Expand)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stubgen_core::Method;

    fn echo_service() -> ServiceDescription {
        ServiceDescription::new(
            "echo",
            "Echo",
            vec![Method::new("Say", "*Msg", "*Reply")],
        )
    }

    fn service_with(n: usize) -> ServiceDescription {
        let methods = (0..n)
            .map(|i| Method::new(format!("M{i}"), format!("Req{i}"), format!("*Resp{i}")))
            .collect();
        ServiceDescription::new("demo", "Demo", methods)
    }

    fn count_occurrences(text: &str, needle: &str) -> usize {
        text.matches(needle).count()
    }

    #[test]
    fn test_renders_client_scaffolding() {
        let out = StubRenderer::new().unwrap().render(&echo_service()).unwrap();
        assert!(out.starts_with("package echo\n"));
        assert!(out.contains("type EchoClient struct {"));
        assert!(out.contains("func NewEchoClient(address string) (*EchoClient, error) {"));
        assert!(out.contains("rpc.Dial(\"tcp\", address)"));
        assert!(out.contains("func (c *EchoClient) Close() error {"));
        assert!(out.contains("return c.client.Close()"));
    }

    #[test]
    fn test_renders_method_with_call_tag() {
        let out = StubRenderer::new().unwrap().render(&echo_service()).unwrap();
        assert!(out.contains("func (c *EchoClient) Say(request *Msg) (*Reply, error) {"));
        assert!(out.contains("var response Reply"));
        assert!(out.contains("c.client.Call(\"Echo.Say\", request, &response)"));
        assert!(out.contains("echo.EchoClient.Say Call error: %w"));
        assert!(out.contains("return &response, nil"));
    }

    #[test]
    fn test_registration_pair_strips_markers() {
        let out = StubRenderer::new().unwrap().render(&echo_service()).unwrap();
        let reply = out.find("gob.Register(Reply{})").expect("response registered");
        let msg = out.find("gob.Register(Msg{})").expect("request registered");
        // Response before request within the pair
        assert!(reply < msg);
    }

    #[test]
    fn test_method_counts_scale_with_n() {
        let renderer = StubRenderer::new().unwrap();
        for n in [0usize, 1, 3] {
            let out = renderer.render(&service_with(n)).unwrap();
            assert_eq!(count_occurrences(&out, "gob.Register("), 2 * n, "N={n}");
            assert_eq!(
                count_occurrences(&out, "func (c *DemoClient) "),
                n + 1, // methods plus Close
                "N={n}"
            );
            assert_eq!(count_occurrences(&out, "func NewDemoClient("), 1, "N={n}");
            assert_eq!(
                count_occurrences(&out, "func (c *DemoClient) Close() error {"),
                1,
                "N={n}"
            );
        }
    }

    #[test]
    fn test_zero_methods_renders_valid_skeleton() {
        let out = StubRenderer::new().unwrap().render(&service_with(0)).unwrap();
        assert!(out.contains("func init() {\n}"));
        assert!(out.contains("type DemoClient struct {"));
        assert!(!out.contains("gob."));
    }

    #[test]
    fn test_rendering_is_deterministic() {
        let renderer = StubRenderer::new().unwrap();
        let service = service_with(3);
        let first = renderer.render(&service).unwrap();
        let second = renderer.render(&service).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_methods_render_in_declaration_order() {
        let out = StubRenderer::new().unwrap().render(&service_with(3)).unwrap();
        let m0 = out.find("func (c *DemoClient) M0(").unwrap();
        let m1 = out.find("func (c *DemoClient) M1(").unwrap();
        let m2 = out.find("func (c *DemoClient) M2(").unwrap();
        assert!(m0 < m1 && m1 < m2);
    }
}
