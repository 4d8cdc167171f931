//! Future/stream bindings for `fidl_async.dart` and the test base classes
//! for `fidl_test.dart`.
//!
//! Methods following the result convention are flattened here: the proxy
//! completes with the success payload or fails with a
//! `$fidl.MethodException` carrying the error, and the binding does the
//! reverse.

use super::{
    doc_lines,
    interface::{decode_arguments, encode_parameters, handler_catch, method_constants, unexpected_ordinal},
    params,
};
use crate::{
    decls::EMPTY_STRUCT_MEMBER,
    model::{Interface, Method, ResultShape},
};

const UNEXPECTED_ORDINAL: &str = "new $fidl.FidlError('Unexpected message ordinal: ${$message.ordinal}')";

fn async_return(m: &Method) -> String {
    match &m.async_response_type {
        Some(t) => format!("Future<{}>", t),
        None => "Future<void>".to_string(),
    }
}

fn response_type(m: &Method) -> &str {
    m.async_response_type.as_deref().unwrap_or("void")
}

/// Expression for a response decoded straight off the wire.
fn decode_response(m: &Method) -> String {
    let count = m.response.wire_parameters.len();
    match (&m.async_response_class, count) {
        (Some(class), _) => {
            let args: Vec<String> = (0..count).map(|i| format!("$types[{}].decode($decoder, 0)", i)).collect();
            format!("new {}({})", class, args.join(", "))
        }
        (None, 0) => "null".to_string(),
        (None, _) => "$types[0].decode($decoder, 0)".to_string(),
    }
}

/// Expression for the success payload held by `$result`.
fn result_value(m: &Method, result: &ResultShape) -> String {
    let ok = &result.result_type.members[0].name;
    let fields: Vec<String> = result
        .value_fields
        .iter()
        .map(|field| format!("$result.{}.{}", ok, field))
        .collect();
    match (&m.async_response_class, fields.len()) {
        (Some(class), _) => format!("new {}({})", class, fields.join(", ")),
        (None, 0) => "null".to_string(),
        (None, _) => fields[0].clone(),
    }
}

/// Hands a decoded response to `ok`, or for result methods the error to `err`.
fn deliver_response(lines: &mut Vec<String>, m: &Method, ok: &str, err: &str) {
    let result = match &m.response.result {
        Some(result) => result,
        None => {
            lines.push(format!("          {}({});", ok, decode_response(m)));
            return;
        }
    };
    let union = &result.result_type;
    lines.push(format!("          final {} $result = $types[0].decode($decoder, 0);", union.name));
    lines.push(format!(
        "          if ($result.$tag == {}.{}) {{",
        union.tag_name, union.members[0].tag
    ));
    lines.push(format!("            {}({});", ok, result_value(m, result)));
    lines.push("          } else {".to_string());
    lines.push(format!(
        "            {}(new $fidl.MethodException($result.{}));",
        err, union.members[1].name
    ));
    lines.push("          }".to_string());
}

/// Encodes `$response` (the value a server future completed with).
fn encode_response(lines: &mut Vec<String>, m: &Method, indent: &str) {
    let wire = &m.response.wire_parameters;
    if wire.is_empty() {
        return;
    }
    lines.push(format!("{}$encoder.alloc({} - $fidl.kMessageHeaderSize);", indent, m.response_size));
    lines.push(format!("{}final List<$fidl.MemberType> $types = {}.response;", indent, m.type_symbol));

    if let Some(result) = &m.response.result {
        let method_params = &m.response.method_parameters;
        let args: Vec<String> = match method_params.len() {
            0 => vec![format!("{}: 0", EMPTY_STRUCT_MEMBER)],
            1 => vec![format!("{}: $response", result.value_fields[0])],
            _ => result
                .value_fields
                .iter()
                .zip(method_params)
                .map(|(field, p)| format!("{}: $response.{}", field, p.name))
                .collect(),
        };
        lines.push(format!(
            "{}$types[0].encode($encoder, {}.with{}({}({})), 0);",
            indent,
            result.result_type.name,
            result.result_type.members[0].ctor_name,
            result.value_type.decl,
            args.join(", ")
        ));
    } else if m.async_response_class.is_some() {
        for (i, p) in wire.iter().enumerate() {
            lines.push(format!("{}$types[{}].encode($encoder, $response.{}, 0);", indent, i, p.name));
        }
    } else {
        lines.push(format!("{}$types[0].encode($encoder, $response, 0);", indent));
    }
}

/// Encodes the error carried by a `$fidl.MethodException` named `_e`.
fn encode_error(lines: &mut Vec<String>, m: &Method, result: &ResultShape, indent: &str) {
    lines.push(format!("{}final $fidl.Encoder $encoder = new $fidl.Encoder({});", indent, m.ordinal_name));
    lines.push(format!("{}$encoder.alloc({} - $fidl.kMessageHeaderSize);", indent, m.response_size));
    lines.push(format!("{}final List<$fidl.MemberType> $types = {}.response;", indent, m.type_symbol));
    lines.push(format!(
        "{}$types[0].encode($encoder, {}.with{}(_e.value), 0);",
        indent, result.result_type.name, result.result_type.members[1].ctor_name
    ));
}

pub fn interface_async_declaration(iface: &Interface) -> String {
    let mut lines = method_constants(iface, |m| m.response.method_parameters.as_slice());

    for m in &iface.methods {
        let class = match &m.async_response_class {
            Some(class) => class,
            None => continue,
        };
        let method_params = &m.response.method_parameters;
        lines.push(String::new());
        lines.push(format!("class {} {{", class));
        for p in method_params {
            lines.push(format!("  final {} {};", p.type_.decl, p.name));
        }
        let fields: Vec<String> = method_params.iter().map(|p| format!("this.{}", p.name)).collect();
        lines.push(format!("  {}({});", class, fields.join(", ")));
        lines.push("}".to_string());
    }
    lines.push(String::new());

    lines.extend(doc_lines(&iface.doc, ""));
    lines.push(format!("abstract class {} {{", iface.name));
    lines.push(format!("  static const String $serviceName = {};", iface.service_name));
    for m in &iface.methods {
        lines.extend(doc_lines(&m.doc, "  "));
        if !m.has_request {
            lines.push(format!("  Stream<{}> get {};", response_type(m), m.name));
        } else if m.transitional {
            lines.push(format!("  {} {}({}) {{", async_return(m), m.name, params(&m.request)));
            lines.push("    return Future.error(UnimplementedError());".to_string());
            lines.push("  }".to_string());
        } else {
            lines.push(format!("  {} {}({});", async_return(m), m.name, params(&m.request)));
        }
    }
    lines.push("}".to_string());
    lines.push(String::new());

    proxy(&mut lines, iface);
    lines.push(String::new());
    binding(&mut lines, iface);
    lines.join("\n")
}

fn proxy(lines: &mut Vec<String>, iface: &Interface) {
    let name = &iface.name;
    let proxy = &iface.proxy_name;
    lines.extend(doc_lines(&iface.doc, ""));
    lines.push(format!("class {} extends $fidl.AsyncProxy<{}>", proxy, name));
    lines.push(format!("    implements {} {{", name));
    lines.push(format!(
        "  {}() : super(new $fidl.AsyncProxyController<{}>($serviceName: {}, $interfaceName: r'{}')) {{",
        proxy, name, iface.service_name, name
    ));
    lines.push("    ctrl.onResponse = _handleResponse;".to_string());
    if iface.has_events {
        lines.push("    ctrl.whenClosed.then((_) {".to_string());
        for m in iface.methods.iter().filter(|m| m.is_event()) {
            lines.push(format!("      _{}EventStreamController.close();", m.name));
        }
        lines.push("    }, onError: (_) {});".to_string());
    }
    lines.push("  }".to_string());
    lines.push(String::new());

    lines.push("  void _handleEvent($fidl.Message $message) {".to_string());
    lines.push("    final $fidl.Decoder $decoder = new $fidl.Decoder($message);".to_string());
    lines.push("    switch ($message.ordinal) {".to_string());
    for m in iface.methods.iter().filter(|m| m.is_event()) {
        let controller = format!("_{}EventStreamController", m.name);
        lines.push(format!("      case {}:", m.ordinal_name));
        lines.push("        try {".to_string());
        lines.push(format!("          final List<$fidl.MemberType> $types = {}.response;", m.type_symbol));
        lines.push(format!("          $decoder.claimMemory({});", m.response_size));
        deliver_response(
            lines,
            m,
            &format!("{}.add", controller),
            &format!("{}.addError", controller),
        );
        handler_catch(lines, &m.type_symbol, "Exception handling event", true);
    }
    unexpected_ordinal(lines, UNEXPECTED_ORDINAL);
    lines.push("  }".to_string());
    lines.push(String::new());

    lines.push("  void _handleResponse($fidl.Message $message) {".to_string());
    lines.push("    final int $txid = $message.txid;".to_string());
    lines.push("    if ($txid == 0) {".to_string());
    lines.push("      _handleEvent($message);".to_string());
    lines.push("      return;".to_string());
    lines.push("    }".to_string());
    lines.push("    final Completer $completer = ctrl.getCompleter($txid);".to_string());
    lines.push("    if ($completer == null) {".to_string());
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
        deliver_response(lines, m, "$completer.complete", "$completer.completeError");
        handler_catch(lines, &m.type_symbol, "Exception handling method response", true);
    }
    unexpected_ordinal(lines, UNEXPECTED_ORDINAL);
    lines.push("  }".to_string());

    for m in &iface.methods {
        lines.push(String::new());
        if !m.has_request {
            lines.push(format!(
                "  final _{}EventStreamController = new StreamController<{}>.broadcast();",
                m.name,
                response_type(m)
            ));
            lines.extend(doc_lines(&m.doc, "  "));
            lines.push("  @override".to_string());
            lines.push(format!(
                "  Stream<{}> get {} => _{}EventStreamController.stream;",
                response_type(m),
                m.name,
                m.name
            ));
            continue;
        }
        lines.extend(doc_lines(&m.doc, "  "));
        lines.push("  @override".to_string());
        lines.push(format!("  {} {}({}) async {{", async_return(m), m.name, params(&m.request)));
        lines.push("    if (!ctrl.isBound) {".to_string());
        lines.push("      return new Future.error(new $fidl.FidlStateException('The proxy is closed.'));".to_string());
        lines.push("    }".to_string());
        lines.push(String::new());
        lines.push(format!("    final $fidl.Encoder $encoder = new $fidl.Encoder({});", m.ordinal_name));
        encode_parameters(lines, "    ", m.request_size, &format!("{}.request", m.type_symbol), &m.request);
        if m.has_response {
            lines.push(format!("    final $completer = new Completer<{}>();", response_type(m)));
            lines.push("    ctrl.sendMessageWithResponse($encoder.message, $completer);".to_string());
            lines.push("    return $completer.future;".to_string());
        } else {
            lines.push("    return new Future.sync(() {".to_string());
            lines.push("      ctrl.sendMessage($encoder.message);".to_string());
            lines.push("    });".to_string());
        }
        lines.push("  }".to_string());
    }
    lines.push("}".to_string());
}

fn binding(lines: &mut Vec<String>, iface: &Interface) {
    let binding = &iface.binding_name;
    lines.push(format!("class {} extends $fidl.AsyncBinding<{}> {{", binding, iface.name));
    if iface.has_events {
        lines.push(format!("  {}() : super(r\"{}\") {{", binding, iface.name));
        lines.push("    final List<StreamSubscription<dynamic>> $subscriptions = [];".to_string());
        lines.push("    void $unsubscribe() {".to_string());
        lines.push("      for (final $sub in $subscriptions) {".to_string());
        lines.push("        $sub.cancel();".to_string());
        lines.push("      }".to_string());
        lines.push("      $subscriptions.clear();".to_string());
        lines.push("    }".to_string());
        lines.push("    whenBound.then((_) {".to_string());
        for m in iface.methods.iter().filter(|m| m.is_event()) {
            lines.push(format!("      if (impl.{} != null) {{", m.name));
            lines.push(format!("        $subscriptions.add(impl.{}.listen(($response) {{", m.name));
            lines.push(format!("          final $fidl.Encoder $encoder = new $fidl.Encoder({});", m.ordinal_name));
            encode_response(lines, m, "          ");
            lines.push("          sendMessage($encoder.message);".to_string());
            match &m.response.result {
                Some(result) => {
                    lines.push("        }, onError: (_e) {".to_string());
                    lines.push("          if (_e is $fidl.MethodException) {".to_string());
                    encode_error(lines, m, result, "            ");
                    lines.push("            sendMessage($encoder.message);".to_string());
                    lines.push("          }".to_string());
                    lines.push("        }));".to_string());
                }
                None => lines.push("        }));".to_string()),
            }
            lines.push("      }".to_string());
        }
        lines.push("    });".to_string());
        lines.push("    whenClosed.then((_) => $unsubscribe());".to_string());
        lines.push("  }".to_string());
    } else {
        lines.push(format!("  {}() : super(r\"{}\");", binding, iface.name));
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
        lines.push(format!("          final {} $future = impl.{}(", async_return(m), m.name));
        decode_arguments(lines, "            ", m.request.len());
        lines.push("          );".to_string());
        if m.has_response {
            lines.push("          $future.then(($response) {".to_string());
            lines.push(format!("            final $fidl.Encoder $encoder = new $fidl.Encoder({});", m.ordinal_name));
            encode_response(lines, m, "            ");
            respond(lines, "            ");
            lines.push("          }, onError: (_e) {".to_string());
            if let Some(result) = &m.response.result {
                lines.push("            if (_e is $fidl.MethodException) {".to_string());
                encode_error(lines, m, result, "              ");
                respond(lines, "              ");
                lines.push("              return;".to_string());
                lines.push("            }".to_string());
            }
            lines.push("            close();".to_string());
            lines.push(format!("            final String _name = {}.name;", m.type_symbol));
            lines.push("            print('Exception handling method call $_name: $_e');".to_string());
            lines.push("          });".to_string());
        }
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

fn respond(lines: &mut Vec<String>, indent: &str) {
    lines.push(format!("{}$fidl.Message $responseMessage = $encoder.message;", indent));
    lines.push(format!("{}$responseMessage.txid = $message.txid;", indent));
    lines.push(format!("{}$respond($responseMessage);", indent));
}

pub fn interface_test_declaration(iface: &Interface) -> String {
    let mut lines = vec![format!("class {0}$TestBase extends {0} {{", iface.name)];
    for m in &iface.methods {
        lines.push("  @override".to_string());
        if m.has_request {
            lines.push(format!("  {} {}({}) {{", async_return(m), m.name, params(&m.request)));
            lines.push("    return Future.error(UnimplementedError());".to_string());
        } else {
            lines.push(format!("  Stream<{}> get {} {{", response_type(m), m.name));
            lines.push("    return Stream.fromFuture(Future.error(UnimplementedError()));".to_string());
        }
        lines.push("  }".to_string());
    }
    lines.push("}".to_string());
    lines.join("\n")
}
