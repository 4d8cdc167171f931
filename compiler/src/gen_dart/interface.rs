//! Callback-style bindings for `fidl.dart`.

use super::{doc_lines, params};
use crate::model::{Interface, Method, Parameter};

fn request_method_signature(m: &Method) -> String {
    let request = params(&m.request);
    if m.has_response {
        let sep = if m.request.is_empty() { "" } else { ", " };
        format!(
            "{}({}{}void callback({}))",
            m.name,
            request,
            sep,
            params(&m.response.wire_parameters)
        )
    } else {
        format!("{}({})", m.name, request)
    }
}

/// `// name: (request) -> (response)` summary above each ordinal.
pub(crate) fn method_summary(m: &Method, response: &[Parameter]) -> String {
    let mut out = format!("// {}:", m.name);
    if m.has_request {
        out.push_str(&format!(" ({})", params(&m.request)));
    }
    if m.has_response {
        out.push_str(&format!(" -> ({})", params(response)));
    }
    out
}

/// Ordinal and method type constants shared by both binding flavors.
pub(crate) fn method_constants(iface: &Interface, response_of: impl Fn(&Method) -> &[Parameter]) -> Vec<String> {
    let mut lines = Vec::new();
    for m in &iface.methods {
        lines.push(method_summary(m, response_of(m)));
        lines.push(format!("const int {} = {:#x};", m.ordinal_name, m.ordinal));
        lines.push(format!("const $fidl.MethodType {} = {};", m.type_symbol, m.type_expr));
    }
    lines
}

/// Lines encoding each parameter from a local of the same name.
pub(crate) fn encode_parameters(lines: &mut Vec<String>, indent: &str, size: u32, types: &str, list: &[Parameter]) {
    if list.is_empty() {
        return;
    }
    lines.push(format!("{}$encoder.alloc({} - $fidl.kMessageHeaderSize);", indent, size));
    lines.push(format!("{}final List<$fidl.MemberType> $types = {};", indent, types));
    for (i, p) in list.iter().enumerate() {
        lines.push(format!("{}$types[{}].encode($encoder, {}, 0);", indent, i, p.name));
    }
}

pub(crate) fn decode_arguments(lines: &mut Vec<String>, indent: &str, count: usize) {
    for i in 0..count {
        lines.push(format!("{}$types[{}].decode($decoder, 0),", indent, i));
    }
}

pub fn interface_declaration(iface: &Interface) -> String {
    let name = &iface.name;
    let mut lines = doc_lines(&iface.doc, "");
    lines.push(format!("abstract class {} {{", name));
    lines.push(format!("  static const String $serviceName = {};", iface.service_name));
    for m in iface.methods.iter().filter(|m| m.has_request) {
        lines.extend(doc_lines(&m.doc, "  "));
        if m.transitional {
            lines.push(format!("  void {} {{", request_method_signature(m)));
            lines.push("    throw UnimplementedError();".to_string());
            lines.push("  }".to_string());
        } else {
            lines.push(format!("  void {};", request_method_signature(m)));
        }
    }
    lines.push("}".to_string());
    lines.push(String::new());

    lines.extend(method_constants(iface, |m| m.response.wire_parameters.as_slice()));
    for m in iface.methods.iter().filter(|m| m.is_event()) {
        lines.push(format!(
            "typedef void {}({});",
            m.callback_type,
            params(&m.response.wire_parameters)
        ));
    }
    lines.push(String::new());

    proxy(&mut lines, iface);
    if iface.has_events {
        lines.push(String::new());
        events(&mut lines, iface);
    }
    lines.push(String::new());
    binding(&mut lines, iface);
    lines.join("\n")
}

fn proxy(lines: &mut Vec<String>, iface: &Interface) {
    let name = &iface.name;
    let proxy = &iface.proxy_name;
    lines.push(format!("class {} extends $fidl.Proxy<{}>", proxy, name));
    lines.push(format!("    implements {} {{", name));
    lines.push(String::new());
    lines.push(format!(
        "  {}() : super(new $fidl.ProxyController<{}>($serviceName: {}, $interfaceName: r'{}')) {{",
        proxy, name, iface.service_name, name
    ));
    lines.push("    ctrl.onResponse = _handleResponse;".to_string());
    lines.push("  }".to_string());
    lines.push(String::new());

    lines.push("  void _handleEvent($fidl.Message $message) {".to_string());
    lines.push("    final $fidl.Decoder $decoder = new $fidl.Decoder($message);".to_string());
    lines.push("    switch ($message.ordinal) {".to_string());
    for m in iface.methods.iter().filter(|m| m.is_event()) {
        lines.push(format!("      case {}:", m.ordinal_name));
        lines.push("        try {".to_string());
        lines.push(format!("          final Function $callback = {};", m.name));
        lines.push("          if ($callback == null) {".to_string());
        lines.push("            $message.closeHandles();".to_string());
        lines.push("            return;".to_string());
        lines.push("          }".to_string());
        lines.push(format!("          final List<$fidl.MemberType> $types = {}.response;", m.type_symbol));
        lines.push(format!("          $decoder.claimMemory({});", m.response_size));
        lines.push("          $callback(".to_string());
        decode_arguments(lines, "            ", m.response.wire_parameters.len());
        lines.push("          );".to_string());
        handler_catch(lines, &m.type_symbol, "Exception handling event", false);
    }
    unexpected_ordinal(lines, "'Unexpected message ordinal: ${$message.ordinal}'");
    lines.push("  }".to_string());
    lines.push(String::new());

    lines.push("  void _handleResponse($fidl.Message $message) {".to_string());
    lines.push("    final int $txid = $message.txid;".to_string());
    lines.push("    if ($txid == 0) {".to_string());
    lines.push("      _handleEvent($message);".to_string());
    lines.push("      return;".to_string());
    lines.push("    }".to_string());
    lines.push("    final Function $callback = ctrl.getCallback($txid);".to_string());
    lines.push("    if ($callback == null) {".to_string());
    lines.push("      $message.closeHandles();".to_string());
    lines.push("      return;".to_string());
    lines.push("    }".to_string());
    lines.push("    final $fidl.Decoder $decoder = new $fidl.Decoder($message);".to_string());
    lines.push("    switch ($message.ordinal) {".to_string());
    for m in iface.methods.iter().filter(|m| m.has_request && m.has_response) {
        lines.push(format!("      case {}:", m.ordinal_name));
        lines.push("        try {".to_string());
        lines.push(format!("          final List<$fidl.MemberType> $types = {}.response;", m.type_symbol));
        lines.push(format!("          $decoder.claimMemory({});", m.response_size));
        lines.push("          $callback(".to_string());
        decode_arguments(lines, "            ", m.response.wire_parameters.len());
        lines.push("          );".to_string());
        handler_catch(lines, &m.type_symbol, "Exception handling method response", false);
    }
    unexpected_ordinal(lines, "'Unexpected message ordinal: ${$message.ordinal}'");
    lines.push("  }".to_string());

    for m in &iface.methods {
        if m.has_request {
            lines.push(String::new());
            lines.push("  @override".to_string());
            lines.push(format!("  void {} {{", request_method_signature(m)));
            lines.push("    if (!ctrl.isBound) {".to_string());
            lines.push("      ctrl.proxyError('The proxy is closed.');".to_string());
            lines.push("      return;".to_string());
            lines.push("    }".to_string());
            lines.push(String::new());
            lines.push(format!("    final $fidl.Encoder $encoder = new $fidl.Encoder({});", m.ordinal_name));
            encode_parameters(lines, "    ", m.request_size, &format!("{}.request", m.type_symbol), &m.request);
            if m.has_response {
                zoned_callback(lines, m);
                lines.push("    ctrl.sendMessageWithResponse($encoder.message, $zonedCallback);".to_string());
            } else {
                lines.push("    ctrl.sendMessage($encoder.message);".to_string());
            }
            lines.push("  }".to_string());
        } else if m.has_response {
            lines.push(String::new());
            lines.push(format!("  {} {};", m.callback_type, m.name));
        }
    }
    lines.push("}".to_string());
}

/// Runs the user callback in the zone the request was made from.
fn zoned_callback(lines: &mut Vec<String>, m: &Method) {
    let response = &m.response.wire_parameters;
    lines.push("    Function $zonedCallback;".to_string());
    lines.push("    if ((callback == null) || identical(Zone.current, Zone.root)) {".to_string());
    lines.push("      $zonedCallback = callback;".to_string());
    lines.push("    } else {".to_string());
    lines.push("      Zone $z = Zone.current;".to_string());
    if response.is_empty() {
        lines.push("      $zonedCallback = $z.bindCallback(callback);".to_string());
    } else {
        let names: Vec<&str> = response.iter().map(|p| p.name.as_str()).collect();
        lines.push(format!("      $zonedCallback = (({}) {{", params(response)));
        lines.push("        $z.bindCallback(() {".to_string());
        lines.push(format!("          callback({});", names.join(", ")));
        lines.push("        })();".to_string());
        lines.push("      });".to_string());
    }
    lines.push("    }".to_string());
}

fn events(lines: &mut Vec<String>, iface: &Interface) {
    lines.push(format!("class {} {{", iface.events_name));
    lines.push(format!("  $fidl.Binding<{}> _binding;", iface.name));
    for m in iface.methods.iter().filter(|m| m.is_event()) {
        lines.push(String::new());
        lines.push(format!("  void {}({}) {{", m.name, params(&m.response.wire_parameters)));
        lines.push(format!("    final $fidl.Encoder $encoder = new $fidl.Encoder({});", m.ordinal_name));
        encode_parameters(
            lines,
            "    ",
            m.response_size,
            &format!("{}.response", m.type_symbol),
            &m.response.wire_parameters,
        );
        lines.push("    _binding.sendMessage($encoder.message);".to_string());
        lines.push("  }".to_string());
    }
    lines.push("}".to_string());
}

fn binding(lines: &mut Vec<String>, iface: &Interface) {
    let binding = &iface.binding_name;
    lines.push(format!("class {} extends $fidl.Binding<{}> {{", binding, iface.name));
    if iface.has_events {
        lines.push(format!("  {}() {{", binding));
        lines.push("    events._binding = this;".to_string());
        lines.push("  }".to_string());
        lines.push(String::new());
        lines.push(format!("  final {0} events = new {0}();", iface.events_name));
    }

    for m in iface.methods.iter().filter(|m| m.has_request && m.has_response) {
        lines.push(String::new());
        lines.push(format!("  Function _{}Responder($fidl.MessageSink $respond, int $txid) {{", m.name));
        lines.push(format!("    return ({}) {{", params(&m.response.wire_parameters)));
        lines.push(format!("      final $fidl.Encoder $encoder = new $fidl.Encoder({});", m.ordinal_name));
        encode_parameters(
            lines,
            "      ",
            m.response_size,
            &format!("{}.response", m.type_symbol),
            &m.response.wire_parameters,
        );
        lines.push("      $fidl.Message $message = $encoder.message;".to_string());
        lines.push("      $message.txid = $txid;".to_string());
        lines.push("      $respond($message);".to_string());
        lines.push("    };".to_string());
        lines.push("  }".to_string());
    }

    lines.push(String::new());
    lines.push("  @override".to_string());
    lines.push("  void handleMessage($fidl.Message $message, $fidl.MessageSink $respond) {".to_string());
    lines.push("    final $fidl.Decoder $decoder = new $fidl.Decoder($message);".to_string());
    lines.push("    switch ($message.ordinal) {".to_string());
    for m in iface.methods.iter().filter(|m| m.has_request) {
        lines.push(format!("      case {}:", m.ordinal_name));
        lines.push("        try {".to_string());
        lines.push(format!("          final List<$fidl.MemberType> $types = {}.request;", m.type_symbol));
        lines.push(format!("          $decoder.claimMemory({});", m.request_size));
        lines.push(format!("          impl.{}(", m.name));
        decode_arguments(lines, "            ", m.request.len());
        if m.has_response {
            lines.push(format!("            _{}Responder($respond, $message.txid),", m.name));
        }
        lines.push("          );".to_string());
        lines.push("        // ignore: avoid_catches_without_on_clauses".to_string());
        lines.push("        } catch(_e) {".to_string());
        lines.push("          close();".to_string());
        lines.push(format!("          final String _name = {}.name;", m.type_symbol));
        lines.push("          print('Exception handling method call $_name: $_e');".to_string());
        lines.push("          rethrow;".to_string());
        lines.push("        }".to_string());
        lines.push("        break;".to_string());
    }
    lines.push("      default:".to_string());
    lines.push("        throw new $fidl.FidlError('Unexpected message name');".to_string());
    lines.push("    }".to_string());
    lines.push("  }".to_string());
    lines.push("}".to_string());
}

/// Closes the proxy when decoding or dispatching an incoming message throws.
/// Async proxies report a `$fidl.FidlError` rather than a bare string.
pub(crate) fn handler_catch(lines: &mut Vec<String>, type_symbol: &str, what: &str, as_fidl_error: bool) {
    let message = format!("'{} $_name: $_e'", what);
    let error = if as_fidl_error { format!("new $fidl.FidlError({})", message) } else { message };
    lines.push("        // ignore: avoid_catches_without_on_clauses".to_string());
    lines.push("        } catch(_e) {".to_string());
    lines.push(format!("          final String _name = {}.name;", type_symbol));
    lines.push(format!("          ctrl.proxyError({});", error));
    lines.push("          ctrl.close();".to_string());
    lines.push("          rethrow;".to_string());
    lines.push("        }".to_string());
    lines.push("        break;".to_string());
}

pub(crate) fn unexpected_ordinal(lines: &mut Vec<String>, error: &str) {
    lines.push("      default:".to_string());
    lines.push(format!("        ctrl.proxyError({});", error));
    lines.push("        ctrl.close();".to_string());
    lines.push("        break;".to_string());
    lines.push("    }".to_string());
}
